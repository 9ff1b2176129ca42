use async_trait::async_trait;

/// The narrow contract the kernel has on a language model backend.
///
/// The kernel only needs a single prompt-in/text-out call; which API serves
/// it is a construction-time decision.  An empty returned string is a valid
/// outcome and is treated as a generation failure by the caller.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable provider name for status display.
    fn name(&self) -> &str;

    /// Model identifier as reported to users.
    fn model_name(&self) -> &str;

    /// Generate a completion for a flat text prompt.
    ///
    /// Errors are reserved for transport and protocol failures; a model that
    /// produced no text returns `Ok("")`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> anyhow::Result<String>;
}
