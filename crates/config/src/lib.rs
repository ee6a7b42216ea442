//! Flowdeck's on-disk locations and settings files
//!
//! Two directories matter to the client:
//! - `~/.config/flowdeck/` holds JSON settings files (e.g.
//!   `backend.json`), read-only from the client's point of view.
//! - `~/.cache/flowdeck/` holds derived data that can be regenerated,
//!   such as locally cached transcripts.
//!
//! Settings are read on demand; nothing here writes to the config
//! directory, so a missing file is an ordinary condition callers check
//! with [`config_exists`] before loading.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "flowdeck";

/// Platform config directory for Flowdeck (`~/.config/flowdeck` on
/// Linux); `None` when the platform has no config directory at all
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Platform cache directory for Flowdeck (`~/.cache/flowdeck` on
/// Linux), the root under which cached transcripts live
pub fn cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join(APP_DIR))
}

/// Whether a settings file is present in the config directory
pub fn config_exists(filename: &str) -> bool {
    config_dir().is_some_and(|dir| dir.join(filename).exists())
}

/// Read and parse a JSON settings file from the config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let dir = config_dir().context("Could not determine config directory")?;
    read_json(&dir.join(filename))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Settings {
        endpoint: String,
    }

    #[test]
    fn test_app_dirs_end_in_app_name() {
        assert!(config_dir().unwrap().ends_with(APP_DIR));
        assert!(cache_dir().unwrap().ends_with(APP_DIR));
    }

    #[test]
    fn test_read_json_parses_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "endpoint": "https://example.com" }"#).unwrap();

        let settings: Settings = read_json(&path).unwrap();
        assert_eq!(settings.endpoint, "https://example.com");
    }

    #[test]
    fn test_read_json_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Settings> = read_json(&dir.path().join("absent.json"));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("absent.json"));
    }

    #[test]
    fn test_read_json_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<Settings> = read_json(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_exists_for_unlikely_name() {
        assert!(!config_exists("no-such-settings-file.json"));
    }
}
