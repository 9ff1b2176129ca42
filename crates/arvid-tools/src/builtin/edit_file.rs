// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The edit tool: propose a first-occurrence string replacement with a
//! unified-diff preview, execute it only after approval.
//!
//! Preconditions (file readable, `old_string` present verbatim) are checked
//! before producing either a preview or an execution, so a stale proposal
//! surfaces as an error-flagged proposal instead of silently no-oping.

use serde_json::json;
use similar::TextDiff;
use tracing::debug;

use super::{error_payload, truncate_chars};
use crate::tool::{EditFileArgs, PendingApproval};
use crate::{sandbox, ExecutionContext, ToolResult};

/// Diff previews are bounded; anything longer is cut with a marker.
const PREVIEW_LIMIT: usize = 4000;

fn args_value(args: &EditFileArgs) -> serde_json::Value {
    json!({
        "path": args.path,
        "old_string": args.old_string,
        "new_string": args.new_string,
    })
}

fn failed(args: &EditFileArgs, preview: impl Into<String>) -> ToolResult {
    ToolResult::Pending(PendingApproval::failed("edit_file", args_value(args), preview))
}

/// Entry point used by the dispatcher.
///
/// Interactive: always returns a proposal.  Autonomous: the human is opted
/// out by policy, so the edit executes immediately.
pub async fn run(ctx: &ExecutionContext, args: EditFileArgs) -> ToolResult {
    if ctx.autonomous {
        return ToolResult::Text(execute(ctx, &args).await);
    }
    propose(ctx, args).await
}

/// Compute the proposal: precondition checks plus a bounded unified diff.
/// Does not write anything.
async fn propose(ctx: &ExecutionContext, args: EditFileArgs) -> ToolResult {
    let Some(root) = &ctx.workspace_root else {
        return failed(&args, "Workspace not configured.");
    };
    let Some(full) = sandbox::resolve(root, &args.path) else {
        return failed(&args, "Path outside workspace.");
    };
    let current = match tokio::fs::read_to_string(&full).await {
        Ok(c) => c,
        Err(e) => return failed(&args, format!("Cannot read file: {e}")),
    };
    if !current.contains(&args.old_string) {
        return failed(&args, "old_string not found in file (file may have changed).");
    }

    let new_content = current.replacen(&args.old_string, &args.new_string, 1);
    let diff = TextDiff::from_lines(current.as_str(), new_content.as_str())
        .unified_diff()
        .context_radius(3)
        .header(&args.path, &args.path)
        .to_string();
    let preview = if diff.len() > PREVIEW_LIMIT {
        format!("{}...", truncate_chars(&diff, PREVIEW_LIMIT))
    } else {
        diff
    };

    debug!(path = %args.path, "edit_file proposal");
    ToolResult::Pending(PendingApproval::proposed("edit_file", args_value(&args), preview))
}

/// Perform the edit: replace the first occurrence and rewrite the file in
/// full.  Call after approval (or from the autonomous path).
pub async fn execute(ctx: &ExecutionContext, args: &EditFileArgs) -> String {
    let Some(root) = &ctx.workspace_root else {
        return error_payload("Path outside workspace or workspace not set.");
    };
    let Some(full) = sandbox::resolve(root, &args.path) else {
        return error_payload("Path outside workspace or workspace not set.");
    };

    let content = match tokio::fs::read_to_string(&full).await {
        Ok(c) => c,
        Err(e) => return error_payload(e.to_string()),
    };
    if !content.contains(&args.old_string) {
        return error_payload("old_string not found in file.");
    }
    let new_content = content.replacen(&args.old_string, &args.new_string, 1);
    match tokio::fs::write(&full, &new_content).await {
        Ok(_) => json!({ "path": args.path, "status": "updated" }).to_string(),
        Err(e) => error_payload(e.to_string()),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
