// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Best-effort workspace context for the system prompt.
//!
//! A directory listing plus up to two quick literal searches seeded from the
//! most recent user message — enough to bias the model toward real file
//! contents without building an index.  Any failure yields an empty block;
//! nothing here may surface an error to the caller.

use arvid_model::{Message, Role};
use arvid_tools::builtin::search_files::search_literal;
use arvid_tools::ExecutionContext;

const MAX_TOP_ENTRIES: usize = 40;
const MAX_SEED_WORDS: usize = 5;
const MAX_SEARCHES: usize = 2;
const MAX_HITS: usize = 5;
const MAX_HIT_CHARS: usize = 80;

pub fn workspace_context_block(ctx: &ExecutionContext, messages: &[Message]) -> String {
    let Some(root) = ctx.workspace_root.as_deref().filter(|p| p.is_dir()) else {
        return String::new();
    };

    let mut lines = vec!["\nWorkspace context (workspace_root is set):".to_string()];

    match std::fs::read_dir(root) {
        Ok(rd) => {
            let mut entries: Vec<String> = rd
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            entries.sort();
            entries.truncate(MAX_TOP_ENTRIES);
            lines.push(format!("Top-level files/dirs: {}", entries.join(", ")));
        }
        Err(_) => lines.push("(could not list workspace)".into()),
    }

    if ctx.inject_search_context {
        if let Some(last_user) = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User && !m.content.trim().is_empty())
        {
            let cleaned = last_user.content.replace(',', " ");
            let words: Vec<&str> = cleaned
                .split_whitespace()
                .filter(|w| w.len() > 3)
                .take(MAX_SEED_WORDS)
                .collect();
            for word in words.iter().take(MAX_SEARCHES) {
                let hits = search_literal(root, word, MAX_HITS);
                if hits.is_empty() {
                    continue;
                }
                for hit in hits {
                    let content: String = hit.content.chars().take(MAX_HIT_CHARS).collect();
                    lines.push(format!("  {}:{} {}", hit.path, hit.line, content));
                }
                // One search with hits is enough context.
                break;
            }
        }
    }

    if lines.len() > 1 {
        lines.join("\n")
    } else {
        String::new()
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
