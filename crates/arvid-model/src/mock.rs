// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ModelClient;

/// Deterministic mock client for tests and dry runs.  Echoes the tail of the
/// prompt back, prefixed with `MOCK:` — never valid instruction JSON, so the
/// kernel surfaces it through the raw-text passthrough path.
#[derive(Default)]
pub struct MockClient;

#[async_trait]
impl ModelClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, prompt: &str, _max_tokens: u32) -> anyhow::Result<String> {
        let tail: String = prompt.chars().rev().take(120).collect::<Vec<_>>()
            .into_iter().rev().collect();
        Ok(format!("MOCK: {}", tail.trim()))
    }
}

/// A pre-scripted mock client.  Each `generate` call pops the next response
/// from the front of the queue, so tests can specify exact model turns —
/// including tool-call instructions — without network access.
pub struct ScriptedMockClient {
    scripts: Mutex<Vec<String>>,
    /// When set, this response is returned forever once the queue is empty
    /// (and for every call if the queue started empty).
    repeat: Option<String>,
    /// Every prompt seen by this client, for test inspection.
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedMockClient {
    pub fn new(scripts: Vec<impl Into<String>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().map(Into::into).collect()),
            repeat: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience: a client that always returns the same response.
    pub fn repeating(response: impl Into<String>) -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            repeat: Some(response.into()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedMockClient {
    fn name(&self) -> &str {
        "scripted-mock"
    }
    fn model_name(&self) -> &str {
        "scripted-mock-model"
    }

    async fn generate(&self, prompt: &str, _max_tokens: u32) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.is_empty() {
            return Ok(self
                .repeat
                .clone()
                .unwrap_or_else(|| "[no more scripts]".into()));
        }
        Ok(scripts.remove(0))
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_echoes_prompt_tail() {
        let out = MockClient.generate("say hello", 100).await.unwrap();
        assert!(out.starts_with("MOCK:"));
        assert!(out.contains("hello"));
    }

    #[tokio::test]
    async fn scripted_pops_in_order() {
        let c = ScriptedMockClient::new(vec!["one", "two"]);
        assert_eq!(c.generate("p", 10).await.unwrap(), "one");
        assert_eq!(c.generate("p", 10).await.unwrap(), "two");
    }

    #[tokio::test]
    async fn scripted_fallback_when_exhausted() {
        let c = ScriptedMockClient::new(vec!["only"]);
        let _ = c.generate("p", 10).await.unwrap();
        assert_eq!(c.generate("p", 10).await.unwrap(), "[no more scripts]");
    }

    #[tokio::test]
    async fn repeating_never_runs_out() {
        let c = ScriptedMockClient::repeating("again");
        for _ in 0..5 {
            assert_eq!(c.generate("p", 10).await.unwrap(), "again");
        }
        assert_eq!(c.calls(), 5);
    }

    #[tokio::test]
    async fn prompts_are_recorded() {
        let c = ScriptedMockClient::new(vec!["r"]);
        let _ = c.generate("the prompt", 10).await.unwrap();
        assert_eq!(c.prompts.lock().unwrap()[0], "the prompt");
    }
}
