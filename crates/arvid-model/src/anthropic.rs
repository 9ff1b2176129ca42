// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Anthropic driver — non-streaming `/v1/messages` wire format.

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::ModelClient;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    model: String,
    api_key: Option<String>,
    messages_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        temperature: Option<f32>,
    ) -> Self {
        let base = base_url.unwrap_or_else(|| "https://api.anthropic.com".into());
        Self {
            model,
            api_key,
            messages_url: format!("{}/v1/messages", base.trim_end_matches('/')),
            temperature: temperature.unwrap_or(0.5),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": self.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        debug!(model = %self.model, "anthropic generate");

        let mut req = self
            .client
            .post(&self.messages_url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }

        let resp = req
            .send()
            .await
            .context("anthropic request failed")?
            .error_for_status()
            .context("anthropic returned an error status")?;

        let value: serde_json::Value =
            resp.json().await.context("anthropic response was not JSON")?;
        Ok(value["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}
