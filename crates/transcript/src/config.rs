//! Backend endpoint configuration
//!
//! Supports loading the backend location from (in order of priority):
//! 1. Runtime environment variables
//! 2. JSON file (~/.config/flowdeck/backend.json)
//! 3. Built-in default (local development backend)

use anyhow::Result;
use serde::Deserialize;

/// Config filename in the Flowdeck config directory
const BACKEND_FILE: &str = "backend.json";

/// Default backend for local development
const DEFAULT_BASE_URL: &str = "http://localhost:7860";

/// Where the transcript client sends its requests
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Deployment API key sent as `x-api-key`, if the backend needs one
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl BackendConfig {
    /// Load the backend config using the following priority:
    /// 1. `FLOWDECK_BACKEND_URL` / `FLOWDECK_API_KEY` environment variables
    /// 2. JSON file (~/.config/flowdeck/backend.json)
    /// 3. Built-in default
    pub fn load() -> Result<Self> {
        if let Some(config) = Self::from_env() {
            return Ok(config);
        }

        if config::config_exists(BACKEND_FILE) {
            return config::load_json(BACKEND_FILE);
        }

        Ok(Self::default())
    }

    /// Read the config from environment variables, if the URL is set
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("FLOWDECK_BACKEND_URL").ok()?;
        if base_url.is_empty() {
            return None;
        }

        let api_key = std::env::var("FLOWDECK_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Some(Self { base_url, api_key })
    }

    /// Parse the config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        use anyhow::Context;
        serde_json::from_str(json).context("Failed to parse backend config JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_backend() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:7860");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = BackendConfig::from_json(
            r#"{ "base_url": "https://backend.example.com", "api_key": "sk-test" }"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://backend.example.com");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_parse_without_api_key() {
        let config =
            BackendConfig::from_json(r#"{ "base_url": "https://backend.example.com" }"#).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(BackendConfig::from_json(r#"{ "other": {} }"#).is_err());
    }

    #[test]
    fn test_env_override_wins() {
        // Sole test touching these variables, so no cross-test races.
        unsafe {
            std::env::set_var("FLOWDECK_BACKEND_URL", "https://env.example.com");
            std::env::set_var("FLOWDECK_API_KEY", "sk-env");
        }
        let config = BackendConfig::load().unwrap();
        assert_eq!(config.base_url, "https://env.example.com");
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));

        // An empty key reads as no key at all.
        unsafe {
            std::env::set_var("FLOWDECK_API_KEY", "");
        }
        let config = BackendConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://env.example.com");
        assert!(config.api_key.is_none());

        // An empty URL reads as unset, dropping the whole override.
        unsafe {
            std::env::set_var("FLOWDECK_BACKEND_URL", "");
        }
        assert!(BackendConfig::from_env().is_none());

        unsafe {
            std::env::remove_var("FLOWDECK_BACKEND_URL");
            std::env::remove_var("FLOWDECK_API_KEY");
        }
        assert!(BackendConfig::from_env().is_none());
    }
}
