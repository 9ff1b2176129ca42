// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The terminal tool: propose a command with a formatted preview, execute it
//! through `sh -c` only after approval.
//!
//! Autonomous mode executes directly, but only when the static safety filter
//! passes — a blocked command still comes back as a proposal so a human can
//! review it, with the block reason visible in the preview.

use serde_json::json;
use tokio::process::Command;
use tracing::debug;

use super::{error_payload, truncate_chars};
use crate::tool::{PendingApproval, RunTerminalArgs};
use crate::{safety, sandbox, ExecutionContext, ToolResult};

const STDOUT_CAP: usize = 8000;
const STDERR_CAP: usize = 2000;

fn args_value(args: &RunTerminalArgs) -> serde_json::Value {
    json!({ "command": args.command, "cwd": args.cwd })
}

fn preview_text(args: &RunTerminalArgs) -> String {
    let mut preview = format!("Command: {}", args.command);
    if let Some(cwd) = &args.cwd {
        preview.push_str(&format!("\nCwd: {cwd}"));
    }
    preview
}

pub async fn run(ctx: &ExecutionContext, args: RunTerminalArgs) -> ToolResult {
    if args.command.trim().is_empty() {
        return ToolResult::error("command is required.");
    }
    if ctx.autonomous {
        match safety::is_blocked(&args.command) {
            None => return ToolResult::Text(execute(ctx, &args).await),
            Some(reason) => {
                let preview = format!(
                    "{}\nBlocked in autonomous mode: {reason}. Approve to run anyway.",
                    preview_text(&args)
                );
                return ToolResult::Pending(PendingApproval::proposed(
                    "run_terminal",
                    args_value(&args),
                    preview,
                ));
            }
        }
    }
    ToolResult::Pending(PendingApproval::proposed(
        "run_terminal",
        args_value(&args),
        preview_text(&args),
    ))
}

/// Spawn the approved command through a shell with a bounded timeout,
/// capturing capped stdout/stderr and the exit code.
pub async fn execute(ctx: &ExecutionContext, args: &RunTerminalArgs) -> String {
    let run_cwd = match (&ctx.workspace_root, &args.cwd) {
        (Some(root), Some(cwd)) => Some(sandbox::resolve(root, cwd).unwrap_or_else(|| root.clone())),
        (Some(root), None) => Some(root.clone()),
        (None, _) => None,
    };

    debug!(cmd = %args.command, "run_terminal execute");

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&args.command);
    if let Some(wd) = &run_cwd {
        cmd.current_dir(wd);
    }
    // A timed-out command must not be left running.
    cmd.kill_on_drop(true);

    let timeout = ctx.command_timeout_secs;
    let result = tokio::time::timeout(std::time::Duration::from_secs(timeout), cmd.output()).await;

    match result {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            json!({
                "stdout": truncate_chars(&stdout, STDOUT_CAP),
                "stderr": truncate_chars(&stderr, STDERR_CAP),
                "returncode": output.status.code().unwrap_or(-1),
            })
            .to_string()
        }
        Ok(Err(e)) => error_payload(format!("spawn error: {e}")),
        Err(_) => error_payload(format!("Command timed out after {timeout}s.")),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
