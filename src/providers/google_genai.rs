use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use zeroize::Zeroize;

use crate::providers::ProviderError;
use crate::traits::{ModelProvider, ProviderResponse, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn blocked_safety_categories(ratings: Option<&Vec<Value>>) -> Vec<String> {
    let mut categories = Vec::new();
    if let Some(ratings) = ratings {
        for rating in ratings {
            let blocked = rating
                .get("blocked")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if !blocked {
                continue;
            }
            if let Some(category) = rating.get("category").and_then(|v| v.as_str()) {
                if !categories.iter().any(|c| c == category) {
                    categories.push(category.to_string());
                }
            }
        }
    }
    categories
}

fn build_gemini_response_note(
    finish_reason: Option<&str>,
    prompt_block_reason: Option<&str>,
    blocked_categories: &[String],
) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(reason) = prompt_block_reason {
        parts.push(format!("prompt blocked ({})", reason));
    }
    if let Some(reason) = finish_reason {
        let upper = reason.to_ascii_uppercase();
        if upper != "STOP" && upper != "MAX_TOKENS" {
            parts.push(format!("finish reason: {}", reason));
        }
    }
    if !blocked_categories.is_empty() {
        parts.push(format!("safety categories: {}", blocked_categories.join(", ")));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Gemini `generateContent` client.
pub struct GoogleGenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl Drop for GoogleGenAiProvider {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

impl GoogleGenAiProvider {
    /// An empty `api_key` is accepted here; calls then fail with a
    /// configuration error without touching the network.
    pub fn new(api_key: &str, base_url: Option<&str>) -> anyhow::Result<Self> {
        Self::with_timeout(api_key, base_url, Duration::from_secs(120))
    }

    pub fn with_timeout(
        api_key: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = crate::providers::build_http_client(timeout)?;
        let normalized_base_url = base_url
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            base_url: normalized_base_url,
            api_key: api_key.trim().to_string(),
        })
    }

    fn build_request_body(prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        })
    }

    /// Parse a Gemini generateContent response into a ProviderResponse.
    fn parse_response(&self, data: &Value, model: &str) -> ProviderResponse {
        let usage = data.get("usageMetadata").and_then(|u| {
            Some(TokenUsage {
                input_tokens: u.get("promptTokenCount")?.as_u64()? as u32,
                output_tokens: u.get("candidatesTokenCount")?.as_u64()? as u32,
                model: model.to_string(),
            })
        });

        let prompt_block_reason = data
            .get("promptFeedback")
            .and_then(|pf| pf.get("blockReason"))
            .and_then(|v| v.as_str());

        let Some(candidate) = data["candidates"].get(0) else {
            warn!(
                model,
                prompt_block_reason = prompt_block_reason.unwrap_or(""),
                "Gemini returned no candidates"
            );
            let response_note = build_gemini_response_note(None, prompt_block_reason, &[])
                .or_else(|| Some("no candidates returned by provider".to_string()));
            return ProviderResponse {
                content: None,
                usage,
                response_note,
            };
        };

        let finish_reason = candidate.get("finishReason").and_then(|v| v.as_str());
        let blocked_categories = blocked_safety_categories(
            candidate
                .get("safetyRatings")
                .and_then(|ratings| ratings.as_array()),
        );
        let response_note =
            build_gemini_response_note(finish_reason, prompt_block_reason, &blocked_categories);

        let mut final_text = String::new();
        if let Some(parts) = candidate["content"]["parts"].as_array() {
            for part in parts {
                // Thinking models emit thought parts alongside the answer.
                let is_thought = part
                    .get("thought")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                if is_thought {
                    continue;
                }
                if let Some(text) = part.get("text").and_then(|s| s.as_str()) {
                    final_text.push_str(text);
                }
            }
        }

        if final_text.trim().is_empty() {
            warn!(
                model,
                finish_reason = finish_reason.unwrap_or(""),
                blocked_categories = ?blocked_categories,
                "Gemini returned empty response"
            );
            debug!(
                model,
                response_json = %serde_json::to_string(data).unwrap_or_else(|_| "<unserializable>".to_string()),
                "Gemini raw response JSON (empty response)"
            );
        }

        ProviderResponse {
            content: if final_text.trim().is_empty() {
                None
            } else {
                Some(final_text)
            },
            usage,
            response_note,
        }
    }
}

#[async_trait]
impl ModelProvider for GoogleGenAiProvider {
    async fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<ProviderResponse> {
        info!(
            api_key_present = !self.api_key.is_empty(),
            "Preparing Google GenAI request"
        );
        if self.api_key.is_empty() {
            return Err(ProviderError::config(
                "Gemini API key not configured. Set GEMINI_API_KEY or provider.api_key in config.toml.",
            )
            .into());
        }

        // Key travels in a header, never in the URL.
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = Self::build_request_body(prompt);

        info!(
            model,
            url_prefix = %self.base_url,
            prompt_chars = prompt.len(),
            "Calling Google GenAI"
        );

        let resp = match self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!("Google GenAI HTTP request failed: {}", e);
                return Err(ProviderError::network(&e).into());
            }
        };

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            error!("Failed to read response body: {}", e);
            ProviderError::network(&e)
        })?;

        if !status.is_success() {
            error!(status = %status, "Google GenAI API error: {}", text);
            return Err(ProviderError::from_status(status.as_u16(), &text).into());
        }

        let data: Value = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse Google GenAI response JSON: {}", e);
            ProviderError::malformed_parse(format!(
                "Malformed response from LLM provider (JSON parse error: {})",
                e
            ))
        })?;
        Ok(self.parse_response(&data, model))
    }
}
