// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Static command deny-list, evaluated only on the autonomous execution path.
//!
//! In interactive mode the human reviewing the preview is the safety control.
//! Matching is regex over the raw command text, case-sensitive; false
//! negatives are expected and acceptable — this is defense in depth, not a
//! sandbox.

use std::sync::OnceLock;

use regex::Regex;

/// Pattern plus the human-readable reason returned when it matches.
const DENY_PATTERNS: &[(&str, &str)] = &[
    (
        r"\brm\s+-[a-zA-Z]*[rR][a-zA-Z]*\s+/",
        "recursive delete of an absolute path",
    ),
    (
        r"\brm\s+-[a-zA-Z]*[rR][a-zA-Z]*\s+~",
        "recursive delete of the home directory",
    ),
    (
        r"(curl|wget)[^|;]*\|\s*(sudo\s+)?(sh|bash|zsh)\b",
        "pipes a network fetch into a shell",
    ),
    (r"\bmkfs(\.[a-z0-9]+)?\b", "reformats a filesystem"),
    (r"\bdd\s+[^|;]*of=/dev/", "raw write to a block device"),
    (r">\s*/dev/sd[a-z]", "raw write to a block device"),
];

fn compiled() -> &'static Vec<(Regex, &'static str)> {
    static DENY: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    DENY.get_or_init(|| {
        DENY_PATTERNS
            .iter()
            .filter_map(|(pat, reason)| Regex::new(pat).ok().map(|re| (re, *reason)))
            .collect()
    })
}

/// Return the block reason when `command` matches the deny-list, else `None`.
pub fn is_blocked(command: &str) -> Option<&'static str> {
    compiled()
        .iter()
        .find(|(re, _)| re.is_match(command))
        .map(|(_, reason)| *reason)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
