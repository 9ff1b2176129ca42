// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde_json::json;

use super::{error_payload, truncate_chars};
use crate::tool::ReadFileArgs;
use crate::{sandbox, ExecutionContext, ToolResult};

const READ_LIMIT: usize = 200_000;

pub async fn run(ctx: &ExecutionContext, args: ReadFileArgs) -> ToolResult {
    let Some(root) = &ctx.workspace_root else {
        return ToolResult::Text(error_payload(
            "Workspace not configured. Set workspace_root in context.",
        ));
    };
    let Some(full) = sandbox::resolve(root, &args.path) else {
        return ToolResult::Text(error_payload("Path outside workspace."));
    };

    match tokio::fs::read(&full).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let content = if text.len() > READ_LIMIT {
                format!("{}...[truncated]", truncate_chars(&text, READ_LIMIT))
            } else {
                text.into_owned()
            };
            ToolResult::Text(json!({ "path": args.path, "content": content }).to_string())
        }
        Err(e) => ToolResult::Text(error_payload(format!("read error: {e}"))),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
