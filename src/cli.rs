// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "arvid",
    about = "A CLI coding agent with human-in-the-loop tool approval",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace root path; file tools resolve against it
    #[arg(long, short = 'w', env = "ARVID_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Run edit_file and run_terminal without asking for approval
    #[arg(long, short = 'a')]
    pub autonomous: bool,

    /// Disable injecting workspace search context into the agent prompt
    #[arg(long)]
    pub no_search_context: bool,

    /// Model to use, e.g. "llama3.2" or "anthropic/claude-sonnet-4-5"
    #[arg(long, short = 'M', env = "ARVID_MODEL")]
    pub model: Option<String>,

    /// Maximum model↔tool turns per submission (overrides config)
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective merged configuration and exit
    ShowConfig,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
