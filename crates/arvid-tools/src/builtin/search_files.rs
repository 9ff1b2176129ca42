// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Literal substring search across text files — no index, no regex.
//!
//! Shared with the context injector, which seeds quick searches from the
//! most recent user message.

use std::path::Path;

use serde::Serialize;
use serde_json::json;
use walkdir::WalkDir;

use super::error_payload;
use crate::tool::SearchFilesArgs;
use crate::{sandbox, ExecutionContext, ToolResult};

/// Extensions considered text; files without any extension are searched too.
const TEXT_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "tsx", "jsx", "html", "css", "json", "md", "txt", "yml", "yaml",
    "toml", "sh", "bat", "env",
];

/// Directories that are never worth walking.
const EXCLUDED_DIRS: &[&str] = &[".git", "target", "node_modules", "__pycache__", ".svn"];

const MAX_MATCHES: usize = 100;
const MAX_FILE_SIZE: u64 = 500_000;
const MAX_LINE_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub line: usize,
    pub content: String,
}

fn is_text_candidate(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => TEXT_EXTENSIONS.contains(&ext),
        None => true,
    }
}

fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|n| EXCLUDED_DIRS.contains(&n))
            .unwrap_or(false)
}

/// Case-sensitive literal search under `base`, capped at `max` hits.
/// Paths in the hits are relative to `base`, with forward slashes.
pub fn search_literal(base: &Path, pattern: &str, max: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let walker = WalkDir::new(base)
        .into_iter()
        .filter_entry(|e| !is_excluded(e));

    for entry in walker.flatten() {
        if hits.len() >= max {
            break;
        }
        if !entry.file_type().is_file() || !is_text_candidate(entry.path()) {
            continue;
        }
        if entry.metadata().map(|m| m.len() > MAX_FILE_SIZE).unwrap_or(true) {
            continue;
        }
        let Ok(text) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        let rel = entry
            .path()
            .strip_prefix(base)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        for (line_no, line) in text.lines().enumerate() {
            if line.contains(pattern) {
                let mut content = line.trim_end().to_string();
                if content.chars().count() > MAX_LINE_CHARS {
                    content = content.chars().take(MAX_LINE_CHARS).collect();
                }
                hits.push(SearchHit { path: rel.clone(), line: line_no + 1, content });
                if hits.len() >= max {
                    break;
                }
            }
        }
    }
    hits
}

pub fn run(ctx: &ExecutionContext, args: SearchFilesArgs) -> ToolResult {
    let Some(root) = &ctx.workspace_root else {
        return ToolResult::Text(error_payload(
            "Workspace not configured. Set workspace_root in context.",
        ));
    };
    let Some(base) = sandbox::resolve(root, &args.path) else {
        return ToolResult::Text(error_payload("Path outside workspace."));
    };
    if args.pattern.is_empty() {
        return ToolResult::Text(error_payload("pattern is required."));
    }

    let matches = search_literal(&base, &args.pattern, MAX_MATCHES);
    ToolResult::Text(
        json!({ "pattern": args.pattern, "path": args.path, "matches": matches }).to_string(),
    )
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
