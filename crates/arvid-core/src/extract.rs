// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Balanced-brace extraction of the first `{...}` span from free-form model
//! text.
//!
//! Models are not guaranteed to emit pure JSON — markdown fences, leading
//! prose, and trailing commentary are all common.  This is deliberately a
//! tokenizer-style scan, not a parser: it finds the candidate span and leaves
//! validation to `serde_json`.

/// Return the first balanced `{...}` slice of `raw`, or `None`.
///
/// Brace depth is tracked outside JSON string literals (escapes honoured), so
/// braces inside quoted values do not unbalance the scan.  When no balanced
/// span closes — a truncated response — fall back to the widest
/// first-`{`-to-last-`}` slice and let the JSON parser reject it if it must.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=i]);
                }
            }
            _ => {}
        }
    }

    // Fallback: first { to last }
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
