use async_trait::async_trait;

/// Model provider: sends a single prompt to an LLM and returns its text.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<ProviderResponse>;
}

/// Token usage statistics from an LLM API response.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub model: String,
}

/// The LLM's response text plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    /// Optional provider-specific note about why no useful output was returned
    /// (for example Gemini finishReason/safety blocking metadata).
    pub response_note: Option<String>,
}
