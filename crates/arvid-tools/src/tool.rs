// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of tool identifiers.
///
/// Dispatch is a `match` over this enum onto strongly typed argument structs;
/// the registry keeps the runtime name+description list only for building the
/// system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    SuggestQuestions,
    GenerateApp,
    ReadFile,
    ListDir,
    SearchFiles,
    EditFile,
    RunTerminal,
    SearchCode,
    AnalyzeCode,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SuggestQuestions => "suggest_questions",
            ToolKind::GenerateApp => "generate_app",
            ToolKind::ReadFile => "read_file",
            ToolKind::ListDir => "list_dir",
            ToolKind::SearchFiles => "search_files",
            ToolKind::EditFile => "edit_file",
            ToolKind::RunTerminal => "run_terminal",
            ToolKind::SearchCode => "search_code",
            ToolKind::AnalyzeCode => "analyze_code",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::SuggestQuestions => {
                "Suggest 1-2 short follow-up questions to clarify the user's app or task. \
                 The current conversation is provided automatically."
            }
            ToolKind::GenerateApp => {
                "Generate a web app (HTML/CSS/JS) from the conversation so far. \
                 Use when the user is done describing and wants the app."
            }
            ToolKind::ReadFile => {
                "Read a file from the workspace. Input: path (relative path). \
                 Requires a configured workspace."
            }
            ToolKind::ListDir => {
                "List directory contents in the workspace. Input: path (relative path, \
                 default '.'). Requires a configured workspace."
            }
            ToolKind::SearchFiles => {
                "Search for a literal string in workspace files (e.g. 'TODO', 'fn main'). \
                 Input: pattern (required), path (optional, default '.'). Returns matching \
                 path, line number, and line content. Requires a configured workspace."
            }
            ToolKind::EditFile => {
                "Edit a file: replace old_string with new_string (first occurrence). \
                 Requires user approval. Input: path, old_string, new_string. \
                 Requires a configured workspace."
            }
            ToolKind::RunTerminal => {
                "Run a shell command in the workspace. Requires user approval. \
                 Input: command (string), cwd (optional, relative path)."
            }
            ToolKind::SearchCode => {
                "Semantic search over the indexed codebase. Input: query (string). \
                 Available when the code index integration is configured."
            }
            ToolKind::AnalyzeCode => {
                "Run code analysis (issues, duplicates, complexity) on the indexed \
                 workspace. Input: path (optional)."
            }
        }
    }

    /// Tools that operate on the dialogue itself receive the full transcript
    /// implicitly — the model cannot be trusted to pass it along.
    pub fn needs_transcript(&self) -> bool {
        matches!(self, ToolKind::SuggestQuestions | ToolKind::GenerateApp)
    }
}

/// One registry row: the data-driven name+description pair for the prompt,
/// plus the statically dispatched kind.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
}

impl ToolSpec {
    pub fn new(kind: ToolKind) -> Self {
        Self { kind, name: kind.name(), description: kind.description() }
    }
}

/// The parsed intent from a model turn.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub name: String,
    pub args: Value,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A proposed but unexecuted destructive action awaiting sign-off.
///
/// Transient: returned to the caller, never stored in the transcript as
/// structured data.  `error` marks proposals whose preconditions already
/// failed, so the caller can surface a concrete message instead of a
/// generic failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
    pub tool: String,
    pub args: Value,
    pub preview: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

impl PendingApproval {
    pub fn proposed(tool: &str, args: Value, preview: impl Into<String>) -> Self {
        Self { tool: tool.into(), args, preview: preview.into(), error: false }
    }

    pub fn failed(tool: &str, args: Value, preview: impl Into<String>) -> Self {
        Self { tool: tool.into(), args, preview: preview.into(), error: true }
    }
}

/// What a tool handler hands back to the loop — the one polymorphic point
/// in the protocol.  Read-only tools always produce `Text`; edit/execute
/// tools produce `Pending` until approved (or executed autonomously).
#[derive(Debug, Clone)]
pub enum ToolResult {
    /// Serialized JSON payload appended to the transcript.
    Text(String),
    /// Execution suspended pending external approval.
    Pending(PendingApproval),
}

impl ToolResult {
    /// Structured error payload — expected failures are data, not panics.
    pub fn error(message: impl Into<String>) -> Self {
        ToolResult::Text(serde_json::json!({ "error": message.into() }).to_string())
    }
}

// ─── Typed argument structs ──────────────────────────────────────────────────

fn default_dot() -> String {
    ".".into()
}

#[derive(Debug, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct ListDirArgs {
    #[serde(default = "default_dot")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchFilesArgs {
    /// Some models say "query" instead of "pattern"; accept both.
    #[serde(alias = "query")]
    pub pattern: String,
    #[serde(default = "default_dot")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditFileArgs {
    pub path: String,
    pub old_string: String,
    pub new_string: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTerminalArgs {
    pub command: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchCodeArgs {
    #[serde(alias = "pattern")]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeCodeArgs {
    #[serde(default)]
    pub path: Option<String>,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
