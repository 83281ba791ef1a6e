use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the moderation service, e.g. `https://mod.example.com`.
    pub api_url: String,
    /// Directory for local state (credential database).
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("MODWARDEN_API_URL")
            .context("MODWARDEN_API_URL environment variable is required")?;
        let api_url = normalize_api_url(&api_url)
            .context("MODWARDEN_API_URL must be an http(s) URL")?;

        let state_dir = env::var("MODWARDEN_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Ok(Config { api_url, state_dir })
    }

    /// Path of the credential database inside the state directory.
    pub fn credentials_path(&self) -> PathBuf {
        self.state_dir.join("credentials.db")
    }
}

/// Normalize a configured API base URL.
///
/// Trailing slashes are stripped so paths can be appended uniformly.
/// Returns None for values that are not http(s) URLs.
pub fn normalize_api_url(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_api_url_strips_trailing_slash() {
        assert_eq!(
            normalize_api_url("https://mod.example.com/"),
            Some("https://mod.example.com".to_string())
        );
        assert_eq!(
            normalize_api_url("https://mod.example.com///"),
            Some("https://mod.example.com".to_string())
        );
    }

    #[test]
    fn test_normalize_api_url_preserves_clean_url() {
        assert_eq!(
            normalize_api_url("http://localhost:8080"),
            Some("http://localhost:8080".to_string())
        );
    }

    #[test]
    fn test_normalize_api_url_rejects_non_http() {
        assert_eq!(normalize_api_url("ftp://mod.example.com"), None);
        assert_eq!(normalize_api_url("mod.example.com"), None);
        assert_eq!(normalize_api_url(""), None);
    }

    #[test]
    fn test_normalize_api_url_trims_whitespace() {
        assert_eq!(
            normalize_api_url("  https://mod.example.com/  "),
            Some("https://mod.example.com".to_string())
        );
    }
}
