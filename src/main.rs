// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Terminal front-end to the agent kernel.
//!
//! Reads user turns from stdin, drives `Kernel::run`, and owns the approval
//! step: a pending proposal is shown with its preview and executed through
//! `Kernel::resume` only on an explicit yes.

mod cli;

use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use arvid_core::{ErrorCode, Kernel};
use arvid_model::{Message, ModelClient};
use arvid_tools::ExecutionContext;
use cli::{Cli, Commands};

/// Previews shown on the terminal are bounded to keep the prompt readable.
const PREVIEW_DISPLAY_CAP: usize = 800;
/// Turn budget for the short continuation after a declined proposal.
const DECLINE_TURNS: u32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = arvid_config::load(cli.config.as_deref())?;

    if let Some(Commands::ShowConfig) = &cli.command {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // Model override: "provider/name" or a bare model name.
    if let Some(spec) = &cli.model {
        match spec.split_once('/') {
            Some((provider, name)) => {
                config.model.provider = provider.to_string();
                config.model.name = name.to_string();
            }
            None => config.model.name = spec.clone(),
        }
    }

    let mut ctx = ExecutionContext::from_config(&config);
    ctx.autonomous = cli.autonomous;
    if cli.no_search_context {
        ctx.inject_search_context = false;
    }

    if let Some(workspace) = &cli.workspace {
        if !workspace.is_dir() {
            eprintln!("Error: workspace is not a directory: {}", workspace.display());
            std::process::exit(1);
        }
        // Allow-listing happens here, at the boundary — the kernel trusts
        // the root once given.
        if !config.workspace.is_allowed(workspace) {
            eprintln!(
                "Error ({}): workspace {} is not under an allowed root",
                ErrorCode::WorkspaceNotAllowed.as_str(),
                workspace.display()
            );
            std::process::exit(1);
        }
        eprintln!("Workspace: {}", workspace.display());
        ctx.workspace_root = Some(workspace.clone());
    } else {
        eprintln!("No workspace set (file tools will fail). Set --workspace or ARVID_WORKSPACE.");
    }

    if ctx.autonomous {
        eprintln!("Autonomous mode: edits and commands run without approval.");
    }

    let client: Option<Arc<dyn ModelClient>> = match arvid_model::from_config(&config.model) {
        Ok(c) => {
            eprintln!("Model: {} ({})", c.model_name(), c.name());
            Some(c)
        }
        Err(e) => {
            tracing::warn!(error = %e, "no model client available");
            None
        }
    };
    let kernel = Kernel::new(client);

    let max_turns = cli.max_turns.unwrap_or(config.agent.max_turns);
    let resume_turns = config.agent.resume_max_turns;

    eprintln!("\nArvid CLI. Type a message and press Enter. Empty line to exit.\n");

    let stdin = std::io::stdin();
    let mut messages: Vec<Message> = Vec::new();

    loop {
        let Some(line) = read_line(&stdin, "You: ") else { break };
        if line.is_empty() {
            break;
        }

        messages.push(Message::user(line));
        let outcome = kernel.run(std::mem::take(&mut messages), &ctx, None, max_turns).await;
        messages = outcome.messages;

        if let Some(code) = outcome.error {
            eprintln!(
                "\nAgent error ({}): {}\n",
                code.as_str(),
                outcome.reply.as_deref().unwrap_or("")
            );
            continue;
        }

        if let Some(pending) = outcome.pending {
            let preview: String = pending.preview.chars().take(PREVIEW_DISPLAY_CAP).collect();
            eprintln!("\n--- Agent wants to run: {} ---\n{}\n---", pending.tool, preview);

            let approved = read_line(&stdin, "Approve? [y/N]: ")
                .map(|a| matches!(a.to_lowercase().as_str(), "y" | "yes"))
                .unwrap_or(false);

            let continued = if approved {
                kernel
                    .resume(
                        std::mem::take(&mut messages),
                        &ctx,
                        &pending.tool,
                        pending.args,
                        resume_turns,
                    )
                    .await
            } else {
                messages.push(Message::system("User declined the tool call."));
                kernel.run(std::mem::take(&mut messages), &ctx, None, DECLINE_TURNS).await
            };
            messages = continued.messages;
            if let Some(reply) = continued.reply {
                println!("\nAgent: {reply}\n");
            } else if continued.pending.is_some() {
                eprintln!("\n(Another action is pending; re-ask to continue.)\n");
            }
            continue;
        }

        if let Some(reply) = outcome.reply {
            println!("\nAgent: {reply}\n");
        }
    }

    eprintln!("Bye.");
    Ok(())
}

/// Prompt on stderr, read one trimmed line from stdin.  `None` on EOF.
fn read_line(stdin: &std::io::Stdin, prompt: &str) -> Option<String> {
    eprint!("{prompt}");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("arvid={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
