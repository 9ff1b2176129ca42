// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Optional integration with an external code-index CLI.
//!
//! The tools shell out to `codeiq` inside the configured index workspace.
//! Registration is gated on the integration being enabled and the workspace
//! existing, so a missing binary surfaces as a structured tool error rather
//! than a registry surprise.

use serde_json::json;
use tokio::process::Command;
use tracing::debug;

use super::{error_payload, truncate_chars};
use crate::tool::{AnalyzeCodeArgs, SearchCodeArgs};
use crate::{ExecutionContext, ToolResult};

const INDEX_BIN: &str = "codeiq";
const INDEX_TIMEOUT_SECS: u64 = 30;
const OUTPUT_CAP: usize = 6000;

/// Registry gate: enabled by context and the workspace is a real directory.
pub fn enabled(ctx: &ExecutionContext) -> bool {
    ctx.code_index_enabled
        && ctx
            .code_index_workspace
            .as_deref()
            .map(|p| p.is_dir())
            .unwrap_or(false)
}

async fn run_index_cli(ctx: &ExecutionContext, cli_args: &[&str]) -> Result<String, String> {
    let Some(workspace) = ctx.code_index_workspace.as_deref().filter(|p| p.is_dir()) else {
        return Err("code index workspace not configured".into());
    };

    debug!(args = ?cli_args, "code index cli");

    let mut cmd = Command::new(INDEX_BIN);
    cmd.args(cli_args).current_dir(workspace).kill_on_drop(true);

    let result =
        tokio::time::timeout(std::time::Duration::from_secs(INDEX_TIMEOUT_SECS), cmd.output())
            .await;

    match result {
        Ok(Ok(output)) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            if text.is_empty() {
                text = "No output.".into();
            }
            Ok(truncate_chars(&text, OUTPUT_CAP).to_string())
        }
        Ok(Err(e)) => Err(format!("code index error: {e}")),
        Err(_) => Err(format!("code index timed out after {INDEX_TIMEOUT_SECS}s")),
    }
}

pub async fn search_code(ctx: &ExecutionContext, args: SearchCodeArgs) -> ToolResult {
    if args.query.is_empty() {
        return ToolResult::Text(error_payload("query required"));
    }
    match run_index_cli(ctx, &["search", &args.query]).await {
        Ok(output) => ToolResult::Text(json!({ "query": args.query, "output": output }).to_string()),
        Err(e) => ToolResult::Text(error_payload(e)),
    }
}

pub async fn analyze_code(ctx: &ExecutionContext, args: AnalyzeCodeArgs) -> ToolResult {
    let path = args.path.unwrap_or_else(|| ".".into());
    match run_index_cli(ctx, &["analyze"]).await {
        Ok(output) => ToolResult::Text(json!({ "path": path, "output": output }).to_string()),
        Err(e) => ToolResult::Text(error_payload(e)),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
