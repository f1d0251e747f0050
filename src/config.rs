use serde::Deserialize;
use std::path::Path;

use crate::providers::DEFAULT_BASE_URL;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Deserialize, Clone)]
pub struct ProviderConfig {
    /// Gemini API key. Empty means onboarding fails with a configuration
    /// error; the dashboard keeps working.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "newme.db".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_port() -> u16 {
    8080
}
fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

impl AppConfig {
    /// Read `path` if it exists (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            AppConfig::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `GEMINI_API_KEY`, `GEMINI_MODEL`, `NEWME_DB_PATH` and
    /// `NEWME_PORT`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.provider.api_key = key.trim().to_string();
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.provider.model = model.trim().to_string();
        }
        if let Some(path) = get("NEWME_DB_PATH") {
            self.state.db_path = path;
        }
        if let Some(port) = get("NEWME_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid NEWME_PORT {:?}: {}", port, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider.model, "gemini-1.5-flash");
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.timeout_secs, 120);
        assert!(config.provider.api_key.is_empty());
        assert_eq!(config.state.db_path, "newme.db");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
    }

    #[test]
    fn test_file_values_then_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[provider]\napi_key = \"file-key\"\nmodel = \"gemini-pro\"\n\n[server]\nport = 9000\n"
        )
        .unwrap();
        let mut config: AppConfig =
            toml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(config.provider.api_key, "file-key");
        assert_eq!(config.server.port, 9000);

        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", " env-key "),
            ("GEMINI_MODEL", ""),
            ("NEWME_DB_PATH", "/tmp/x.db"),
        ]
        .into_iter()
        .collect();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.provider.api_key, "env-key");
        assert_eq!(config.provider.model, "gemini-pro");
        assert_eq!(config.state.db_path, "/tmp/x.db");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == "NEWME_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid NEWME_PORT"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let mut config = AppConfig::default();
        config.provider.api_key = "secret-value".to_string();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
