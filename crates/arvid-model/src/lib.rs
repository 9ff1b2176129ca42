mod anthropic;
mod client;
mod mock;
mod ollama;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::ModelClient;
pub use mock::{MockClient, ScriptedMockClient};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use types::{render_transcript, Message, Role};

use std::sync::Arc;

use anyhow::bail;
use arvid_config::ModelConfig;

/// Construct a shared [`ModelClient`] from configuration.
///
/// The returned handle is meant to be built once per process and injected
/// into the kernel — there is deliberately no global client state.
///
/// Provider selection:
/// - `"ollama"` → [`OllamaClient`] (local server, no API key)
/// - `"openai"` → [`OpenAiClient`]
/// - `"anthropic"` → [`AnthropicClient`]
/// - `"mock"` → [`MockClient`] (echo-back, for tests and dry runs)
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Arc<dyn ModelClient>> {
    let key = resolve_api_key(cfg);
    match cfg.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaClient::new(
            cfg.name.clone(),
            cfg.base_url.clone(),
            cfg.temperature,
        ))),
        "openai" => Ok(Arc::new(OpenAiClient::new(
            cfg.name.clone(),
            key,
            cfg.base_url.clone(),
            cfg.temperature,
        ))),
        "anthropic" => Ok(Arc::new(AnthropicClient::new(
            cfg.name.clone(),
            key,
            cfg.base_url.clone(),
            cfg.temperature,
        ))),
        "mock" => Ok(Arc::new(MockClient)),
        other => bail!("unknown model provider: {other}"),
    }
}

fn resolve_api_key(cfg: &ModelConfig) -> Option<String> {
    if let Some(k) = &cfg.api_key {
        return Some(k.clone());
    }
    if let Some(env) = &cfg.api_key_env {
        return std::env::var(env).ok();
    }
    // Canonical env var per provider.
    let canonical = match cfg.provider.as_str() {
        "openai" => "OPENAI_API_KEY",
        "anthropic" => "ANTHROPIC_API_KEY",
        _ => return None,
    };
    std::env::var(canonical).ok()
}
