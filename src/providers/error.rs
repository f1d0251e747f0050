use std::fmt;

use crate::utils::truncate_str;

/// Classified provider error: tells the caller *why* roadmap generation failed.
/// The detail is for logs; end users only ever see a generic sentence.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// API key missing. Raised before any network call.
    Config,
    /// 401/403: bad API key or permissions.
    Auth,
    /// 429: rate limited.
    RateLimit,
    /// 404 or "model not found": bad model name.
    NotFound,
    /// 408, request timeout, or provider took too long.
    Timeout,
    /// Connection refused, DNS failure, reset, etc.
    Network,
    /// 500/502/503/504: provider-side outage.
    ServerError,
    /// 2xx with no text in the first candidate.
    EmptyResponse,
    /// Envelope or payload was not the JSON we expected.
    MalformedResponse,
    /// Anything else.
    Unknown,
}

impl ProviderError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Auth,
            404 => ProviderErrorKind::NotFound,
            408 => ProviderErrorKind::Timeout,
            429 => ProviderErrorKind::RateLimit,
            500 | 502 | 503 | 504 => ProviderErrorKind::ServerError,
            _ => ProviderErrorKind::Unknown,
        };
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status");

        Self {
            kind,
            status: Some(status),
            message: format!("{} - {}", status_text, truncate_body(body)),
        }
    }

    pub fn network(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else {
            ProviderErrorKind::Network
        };
        Self {
            kind,
            status: None,
            message: err.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Config,
            status: None,
            message: message.into(),
        }
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::EmptyResponse,
            status: None,
            message: message.into(),
        }
    }

    pub fn malformed_parse(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::MalformedResponse,
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "Provider error ({}, {:?}): {}", status, self.kind, self.message)
        } else {
            write!(f, "Provider error ({:?}): {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ProviderError {}

fn truncate_body(body: &str) -> String {
    truncate_str(body, 300)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_and_keeps_status_text() {
        let err = ProviderError::from_status(429, r#"{"error":"slow down"}"#);
        assert_eq!(err.kind, ProviderErrorKind::RateLimit);
        assert_eq!(err.status, Some(429));
        assert!(err.message.starts_with("Too Many Requests - "));
        assert!(err.message.contains("slow down"));

        let err = ProviderError::from_status(503, "");
        assert_eq!(err.kind, ProviderErrorKind::ServerError);
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1_000);
        let err = ProviderError::from_status(400, &body);
        assert_eq!(err.kind, ProviderErrorKind::Unknown);
        assert!(err.message.len() < 400);
        assert!(err.message.ends_with("..."));
    }

    #[test]
    fn test_display_includes_kind() {
        let err = ProviderError::config("GEMINI_API_KEY is not set");
        assert_eq!(
            err.to_string(),
            "Provider error (Config): GEMINI_API_KEY is not set"
        );
    }
}
