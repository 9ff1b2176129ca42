// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The conversation/tool loop.
//!
//! Stateless across invocations apart from the transcript it is given: the
//! caller persists messages between turns, and a pending approval is the
//! continuation token that carries execution across the `run` → `resume`
//! boundary.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use arvid_model::{render_transcript, Message, ModelClient};
use arvid_tools::builtin::{dispatch, execute_approved};
use arvid_tools::{
    build_tools, find_tool, ExecutionContext, PendingApproval, ToolInvocation, ToolResult, ToolSpec,
};

use crate::inject::workspace_context_block;
use crate::prompts::{has_system_prompt, system_prompt};

/// Default turn budget for one `run` invocation.
pub const DEFAULT_MAX_TURNS: u32 = 5;
/// Default turn budget for the continuation after an approved action.
pub const DEFAULT_RESUME_TURNS: u32 = 3;

/// Token budget for a single instruction generation.
const GENERATION_MAX_TOKENS: u32 = 600;
/// Raw model text surfaced verbatim is bounded to this many chars.
const RAW_REPLY_CAP: usize = 1000;

/// Terminal error classes surfaced to callers.
///
/// Web-facing callers map these onto HTTP statuses (503/400/408); the kernel
/// itself only ever produces `NoLlmConfigured` and `AgentTimeout` —
/// `WorkspaceNotAllowed` belongs to the caller's allow-list check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoLlmConfigured,
    WorkspaceNotAllowed,
    AgentTimeout,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoLlmConfigured => "no_llm_configured",
            ErrorCode::WorkspaceNotAllowed => "workspace_not_allowed",
            ErrorCode::AgentTimeout => "agent_timeout",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one kernel invocation produced.
///
/// Exactly one of `reply` / `pending` is set on success paths; `error`
/// accompanies terminal failures and still carries a human-readable `reply`.
#[derive(Debug)]
pub struct LoopOutcome {
    pub messages: Vec<Message>,
    pub reply: Option<String>,
    pub pending: Option<PendingApproval>,
    pub error: Option<ErrorCode>,
}

impl LoopOutcome {
    fn replied(messages: Vec<Message>, reply: impl Into<String>) -> Self {
        Self { messages, reply: Some(reply.into()), pending: None, error: None }
    }

    fn suspended(messages: Vec<Message>, pending: PendingApproval) -> Self {
        Self { messages, reply: None, pending: Some(pending), error: None }
    }

    fn failed(messages: Vec<Message>, reply: impl Into<String>, error: ErrorCode) -> Self {
        Self { messages, reply: Some(reply.into()), pending: None, error: Some(error) }
    }
}

/// The agent kernel.  Owns nothing but the injected model client handle —
/// construct once per process and share.
pub struct Kernel {
    client: Option<Arc<dyn ModelClient>>,
}

impl Kernel {
    pub fn new(client: Option<Arc<dyn ModelClient>>) -> Self {
        Self { client }
    }

    /// Drive the loop: model call → parsed instruction → tool dispatch or
    /// final reply, bounded by `max_turns`.
    ///
    /// A destructive tool in a non-autonomous context suspends the loop:
    /// the outcome carries `pending` and no reply, the underlying action has
    /// not happened, and the caller re-enters through [`Kernel::resume`]
    /// after approval.
    pub async fn run(
        &self,
        messages: Vec<Message>,
        ctx: &ExecutionContext,
        tools: Option<Vec<ToolSpec>>,
        max_turns: u32,
    ) -> LoopOutcome {
        let tools = tools.unwrap_or_else(|| build_tools(ctx));
        let mut current = messages;

        // Idempotent re-entry: a resumed conversation already carries the
        // system prompt and must not accumulate a second one.
        if !has_system_prompt(&current) {
            let workspace_block = workspace_context_block(ctx, &current);
            current.insert(
                0,
                Message::system(system_prompt(&tools, &workspace_block, ctx.autonomous)),
            );
        }

        let Some(client) = &self.client else {
            return LoopOutcome::failed(
                current,
                "I don't have a language model configured. Set OPENAI_API_KEY or \
                 ANTHROPIC_API_KEY, or run a local Ollama server.",
                ErrorCode::NoLlmConfigured,
            );
        };

        for turn in 0..max_turns {
            let prompt = format!(
                "Current conversation:\n\n{}\n\nYour next step (JSON only):",
                render_transcript(&current)
            );

            let raw = match client.generate(&prompt, GENERATION_MAX_TOKENS).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(turn, error = %e, "model generation failed");
                    String::new()
                }
            };
            if raw.trim().is_empty() {
                return LoopOutcome::replied(
                    current,
                    "I couldn't generate a response. Check the model configuration.",
                );
            }

            let raw = raw.trim();
            let Some(json_str) = crate::extract::extract_json_object(raw) else {
                let lower = raw.to_lowercase();
                if !lower.contains("reply") && !lower.contains("tool") {
                    // The model answered in prose without attempting the
                    // protocol; surface its text rather than an error.
                    let capped: String = raw.chars().take(RAW_REPLY_CAP).collect();
                    return LoopOutcome::replied(current, capped);
                }
                return LoopOutcome::replied(current, "I didn't understand the response format.");
            };

            let data: Value = match serde_json::from_str(json_str) {
                Ok(v) => v,
                Err(e) => {
                    warn!(turn, error = %e, "instruction JSON did not parse");
                    return LoopOutcome::replied(
                        current,
                        "I couldn't parse my own response. Please try again.",
                    );
                }
            };

            if let Some(reply) = data
                .get("reply")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                return LoopOutcome::replied(current, reply);
            }

            let invocation = ToolInvocation {
                name: data
                    .get("tool")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                args: data
                    .get("args")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default())),
            };

            let Some(spec) = find_tool(&tools, &invocation.name) else {
                // Model error, not a fatal one: correct it and keep going.
                let valid: Vec<&str> = tools.iter().map(|t| t.name).collect();
                debug!(turn, tool = %invocation.name, "invalid tool requested");
                current.push(Message::system(format!(
                    "[Invalid tool: {}. Valid: {valid:?}]",
                    invocation.name
                )));
                continue;
            };

            match dispatch(spec.kind, ctx, invocation.args, &current).await {
                ToolResult::Pending(pending) => {
                    // Human-in-the-loop as control flow: return instead of
                    // awaiting input.  The caller resumes after approval.
                    return LoopOutcome::suspended(current, pending);
                }
                ToolResult::Text(text) => {
                    current.push(Message::system(format!(
                        "[Tool {} result]: {text}",
                        invocation.name
                    )));
                }
            }
        }

        LoopOutcome::failed(
            current,
            "I hit the turn limit. Please try a shorter conversation or rephrase.",
            ErrorCode::AgentTimeout,
        )
    }

    /// Execute an approved action and continue the conversation.
    ///
    /// This is the only path by which a proposal becomes an execution.  The
    /// result is recorded in the transcript as a system message and the loop
    /// re-runs with a smaller budget.
    pub async fn resume(
        &self,
        messages: Vec<Message>,
        ctx: &ExecutionContext,
        approved_tool: &str,
        approved_args: Value,
        max_turns_after: u32,
    ) -> LoopOutcome {
        let result = execute_approved(ctx, approved_tool, approved_args).await;

        let mut current = messages;
        current.push(Message::system(format!(
            "[User approved {approved_tool}. Result]: {result}"
        )));

        self.run(current, ctx, None, max_turns_after).await
    }
}
