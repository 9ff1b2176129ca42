// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use arvid_model::{Message, Role};
use arvid_tools::ToolSpec;

/// Fixed prefix of the system instruction.
///
/// Doubles as the idempotence sentinel: a transcript whose first message
/// contains this substring already carries the system prompt, and re-entry
/// after an approval must not add a second one.
pub const SENTINEL: &str = "You are a helpful coding and product assistant";

/// Build the system instruction: tool catalog, injected workspace context,
/// and the strict one-JSON-object-per-turn output contract.
pub fn system_prompt(tools: &[ToolSpec], workspace_block: &str, autonomous: bool) -> String {
    let tool_descriptions = tools
        .iter()
        .map(|t| format!("- {}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let approval_note = if autonomous {
        " Autonomous mode: edit_file and run_terminal will run immediately without asking."
    } else {
        " For file edits or running commands, use edit_file or run_terminal; \
         the user will approve before they run."
    };

    format!(
        "{SENTINEL}. You have access to these tools:\n\
         \n\
         {tool_descriptions}\n\
         {workspace_block}\n\
         \n\
         Reply with JSON only. Either:\n\
         1) To call a tool: {{\"thought\": \"brief reasoning\", \"tool\": \"tool_name\", \"args\": {{...}}}}\n\
         2) To reply to the user and finish: {{\"thought\": \"brief reasoning\", \"reply\": \"your reply text\"}}\n\
         \n\
         Be concise.{approval_note}"
    )
}

/// True when the transcript already starts with our system instruction.
pub fn has_system_prompt(messages: &[Message]) -> bool {
    messages
        .first()
        .map(|m| m.role == Role::System && m.content.contains(SENTINEL))
        .unwrap_or(false)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
