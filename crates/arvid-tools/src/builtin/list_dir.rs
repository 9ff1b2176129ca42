// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde_json::json;

use super::error_payload;
use crate::tool::ListDirArgs;
use crate::{sandbox, ExecutionContext, ToolResult};

pub async fn run(ctx: &ExecutionContext, args: ListDirArgs) -> ToolResult {
    let Some(root) = &ctx.workspace_root else {
        return ToolResult::Text(error_payload(
            "Workspace not configured. Set workspace_root in context.",
        ));
    };
    let Some(full) = sandbox::resolve(root, &args.path) else {
        return ToolResult::Text(error_payload("Path outside workspace."));
    };

    match tokio::fs::read_dir(&full).await {
        Ok(mut rd) => {
            let mut entries = Vec::new();
            while let Ok(Some(entry)) = rd.next_entry().await {
                let name = entry.file_name().to_string_lossy().to_string();
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                entries.push(if is_dir { format!("{name}/") } else { name });
            }
            entries.sort();
            ToolResult::Text(json!({ "path": args.path, "entries": entries }).to_string())
        }
        Err(e) => ToolResult::Text(error_payload(format!("list error: {e}"))),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
