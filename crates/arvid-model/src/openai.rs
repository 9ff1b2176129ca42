// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! OpenAI driver — non-streaming `/chat/completions` wire format.
//!
//! The flat prompt is sent as a single user message; any OpenAI-compatible
//! server (LiteLLM, vLLM, LM Studio) works via `base_url`.

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::ModelClient;

pub struct OpenAiClient {
    model: String,
    api_key: Option<String>,
    chat_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        temperature: Option<f32>,
    ) -> Self {
        let base = base_url.unwrap_or_else(|| "https://api.openai.com/v1".into());
        Self {
            model,
            api_key,
            chat_url: format!("{}/chat/completions", base.trim_end_matches('/')),
            temperature: temperature.unwrap_or(0.5),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": max_tokens,
            "temperature": self.temperature,
        });

        debug!(model = %self.model, "openai generate");

        let mut req = self.client.post(&self.chat_url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .context("openai request failed")?
            .error_for_status()
            .context("openai returned an error status")?;

        let value: serde_json::Value = resp.json().await.context("openai response was not JSON")?;
        Ok(value["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}
