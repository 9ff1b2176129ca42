// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Ollama driver — local `/api/generate` endpoint, no authentication.

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::ModelClient;

pub struct OllamaClient {
    model: String,
    generate_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(model: String, base_url: Option<String>, temperature: Option<f32>) -> Self {
        let base = base_url.unwrap_or_else(|| "http://localhost:11434".into());
        Self {
            model,
            generate_url: format!("{}/api/generate", base.trim_end_matches('/')),
            temperature: temperature.unwrap_or(0.7),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "num_predict": max_tokens,
                "temperature": self.temperature,
            },
        });

        debug!(model = %self.model, url = %self.generate_url, "ollama generate");

        let resp = self
            .client
            .post(&self.generate_url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?
            .error_for_status()
            .context("ollama returned an error status")?;

        let value: serde_json::Value = resp.json().await.context("ollama response was not JSON")?;
        Ok(value
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}
