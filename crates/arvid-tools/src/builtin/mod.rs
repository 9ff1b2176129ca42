// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Built-in tool handlers and the closed dispatch over [`ToolKind`].

pub mod builder;
pub mod code_index;
pub mod edit_file;
pub mod list_dir;
pub mod read_file;
pub mod run_terminal;
pub mod search_files;

use arvid_model::Message;
use serde_json::Value;
use tracing::debug;

use crate::{ExecutionContext, ToolKind, ToolResult};

fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolResult> {
    serde_json::from_value(args)
        .map_err(|e| ToolResult::error(format!("invalid arguments for {tool}: {e}")))
}

/// Dispatch one tool invocation.
///
/// Argument parsing failures and every expected handler failure come back as
/// structured `{"error": …}` text results — a single bad invocation never
/// aborts the loop.
pub async fn dispatch(
    kind: ToolKind,
    ctx: &ExecutionContext,
    args: Value,
    transcript: &[Message],
) -> ToolResult {
    debug!(tool = kind.name(), "dispatching tool");
    match kind {
        ToolKind::SuggestQuestions => builder::suggest_questions(transcript),
        ToolKind::GenerateApp => builder::generate_app(transcript),
        ToolKind::ReadFile => match parse_args(kind.name(), args) {
            Ok(a) => read_file::run(ctx, a).await,
            Err(e) => e,
        },
        ToolKind::ListDir => match parse_args(kind.name(), args) {
            Ok(a) => list_dir::run(ctx, a).await,
            Err(e) => e,
        },
        ToolKind::SearchFiles => match parse_args(kind.name(), args) {
            Ok(a) => search_files::run(ctx, a),
            Err(e) => e,
        },
        ToolKind::EditFile => match parse_args(kind.name(), args) {
            Ok(a) => edit_file::run(ctx, a).await,
            Err(e) => e,
        },
        ToolKind::RunTerminal => match parse_args(kind.name(), args) {
            Ok(a) => run_terminal::run(ctx, a).await,
            Err(e) => e,
        },
        ToolKind::SearchCode => match parse_args(kind.name(), args) {
            Ok(a) => code_index::search_code(ctx, a).await,
            Err(e) => e,
        },
        ToolKind::AnalyzeCode => match parse_args(kind.name(), args) {
            Ok(a) => code_index::analyze_code(ctx, a).await,
            Err(e) => e,
        },
    }
}

/// Execute an approved destructive action directly.
///
/// This is the only path that converts a proposal into an execution; it
/// bypasses the preview stage entirely.  Side effects happen at most once per
/// call — the caller must not resubmit the same approval.
pub async fn execute_approved(ctx: &ExecutionContext, tool: &str, args: Value) -> String {
    match tool {
        "edit_file" => match serde_json::from_value(args) {
            Ok(a) => edit_file::execute(ctx, &a).await,
            Err(e) => error_payload(format!("invalid arguments for edit_file: {e}")),
        },
        "run_terminal" => match serde_json::from_value(args) {
            Ok(a) => run_terminal::execute(ctx, &a).await,
            Err(e) => error_payload(format!("invalid arguments for run_terminal: {e}")),
        },
        other => error_payload(format!("Unknown tool: {other}")),
    }
}

pub(crate) fn error_payload(message: impl Into<String>) -> String {
    serde_json::json!({ "error": message.into() }).to_string()
}

/// Truncate on a char boundary at or below `max` bytes.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
