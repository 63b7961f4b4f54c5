use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub token_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = std::env::var("NUTRITRACK_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();
        if api_base_url.is_empty() {
            anyhow::bail!("NUTRITRACK_API_URL must not be empty");
        }
        let timeout_secs = std::env::var("NUTRITRACK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        let token_path = match std::env::var("NUTRITRACK_TOKEN_FILE") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_token_path(),
        };
        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            token_path,
        })
    }

    /// Config for tests and tools that talk to a specific backend.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
            token_path: default_token_path(),
        }
    }
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nutritrack")
        .join("token")
}
