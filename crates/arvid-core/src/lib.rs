mod extract;
mod inject;
mod kernel;
mod prompts;

#[cfg(test)]
mod tests;

pub use extract::extract_json_object;
pub use inject::workspace_context_block;
pub use kernel::{ErrorCode, Kernel, LoopOutcome, DEFAULT_MAX_TURNS, DEFAULT_RESUME_TURNS};
pub use prompts::{has_system_prompt, system_prompt};
