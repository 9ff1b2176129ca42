// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Serde default helper — returns `true`.
///
/// `#[serde(default)]` on a `bool` always falls back to `bool::default()`
/// (i.e. `false`), so fields that should be enabled unless the user
/// explicitly disables them need a named function.
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider identifier: "ollama" | "openai" | "anthropic" | "mock"
    pub provider: String,
    /// Model name forwarded to the provider API
    pub name: String,
    /// Environment variable that holds the API key (read at runtime)
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env in config files to avoid secrets
    /// in version-controlled files
    pub api_key: Option<String>,
    /// Base URL override.  For hosted providers the correct default is
    /// auto-selected; for ollama this is the server address.
    pub base_url: Option<String>,
    /// Maximum tokens to request in a single generation
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0–2.0)
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        // A local Ollama server is the zero-configuration default so arvid
        // runs without any API key.  resolve_api_key() in arvid-model falls
        // through to the canonical env var (OPENAI_API_KEY / ANTHROPIC_API_KEY)
        // when the provider is overridden.
        Self {
            provider: "ollama".into(),
            name: "mistral:7b".into(),
            api_key_env: None,
            api_key: None,
            base_url: None,
            max_tokens: Some(600),
            temperature: Some(0.7),
        }
    }
}

fn default_max_turns() -> u32 {
    8
}
fn default_resume_max_turns() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model↔tool turns per submission before the kernel stops
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Turn budget for the continuation after an approved action
    #[serde(default = "default_resume_max_turns")]
    pub resume_max_turns: u32,
    /// Inject workspace listing and quick search hits into the system prompt
    #[serde(default = "default_true")]
    pub inject_search_context: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            resume_max_turns: default_resume_max_turns(),
            inject_search_context: true,
        }
    }
}

fn default_command_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Timeout in seconds for a single approved terminal command
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Enable the external code-index tools (search_code / analyze_code)
    #[serde(default = "default_true")]
    pub code_index_enabled: bool,
    /// Workspace the code-index CLI runs in.  The tools are only registered
    /// when this points at an existing directory.
    #[serde(default)]
    pub code_index_workspace: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout_secs(),
            code_index_enabled: true,
            code_index_workspace: None,
        }
    }
}

/// Workspace allow-listing.
///
/// This check belongs to the caller, not the kernel: the CLI (or any other
/// front-end) validates the requested workspace root against `allowed_roots`
/// before the kernel ever runs.  The kernel trusts the root it is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Absolute path prefixes a workspace root may live under.
    /// Empty list = any path is allowed (single-operator local tool).
    #[serde(default)]
    pub allowed_roots: Vec<String>,
}

impl WorkspaceConfig {
    /// Return `true` when `path` is permitted as a workspace root.
    ///
    /// Comparison is component-wise on lexically normalized absolute paths,
    /// so `/srv/work-evil` is not accepted by an allow entry of `/srv/work`.
    pub fn is_allowed(&self, path: &Path) -> bool {
        if self.allowed_roots.is_empty() {
            return true;
        }
        let candidate = normalize_lexically(path);
        self.allowed_roots.iter().any(|root| {
            let root = normalize_lexically(Path::new(root));
            !root.as_os_str().is_empty() && candidate.starts_with(&root)
        })
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
