mod error;
mod google_genai;

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

pub use error::{ProviderError, ProviderErrorKind};
pub use google_genai::{GoogleGenAiProvider, DEFAULT_BASE_URL};

/// Build an HTTP client, falling back to a proxy-less client when system
/// proxy discovery is unavailable in the runtime environment.
pub(crate) fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    // Tests talk to local mock servers; never route them through a proxy.
    if cfg!(test)
        || matches!(
            std::env::var("NEWME_DISABLE_SYSTEM_PROXY_DISCOVERY").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        )
    {
        return Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e));
    }

    match Client::builder().timeout(timeout).build() {
        Ok(client) => return Ok(client),
        Err(e) => {
            warn!(
                error = %e,
                "HTTP client build with system proxy support failed; retrying with proxy discovery disabled"
            );
        }
    }

    Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}
