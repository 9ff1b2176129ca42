mod loader;
mod schema;

pub use loader::load;
pub use schema::{AgentConfig, Config, ModelConfig, ToolsConfig, WorkspaceConfig};
