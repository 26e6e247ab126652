//! Configuration handling for the registration form

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Log filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "register_form=info";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// tracing-subscriber filter directive
    pub log_filter: Option<String>,
    /// Append logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
    /// Give up on an image read after this many seconds
    pub ingest_timeout_secs: Option<u64>,
    /// Directory that relative image paths are resolved against
    pub image_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "register-form", "register-form")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn ingest_timeout(&self) -> Option<Duration> {
        self.ingest_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Resolve a typed image path against `image_dir`
    pub fn resolve_image_path(&self, input: &str) -> PathBuf {
        let path = PathBuf::from(input.trim());
        match &self.image_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("register-form").join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.log_filter.is_none());
        assert!(config.ingest_timeout_secs.is_none());
        assert!(config.image_dir.is_none());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.ingest_timeout(), None);
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        let json = r#"{"ingest_timeout_secs": 5, "unknown_field": "value"}"#;
        let parsed: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.ingest_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = AppConfig {
            ingest_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.ingest_timeout(), None);
    }

    #[test]
    fn test_resolve_image_path() {
        let config = AppConfig {
            image_dir: Some(PathBuf::from("/photos")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_image_path(" ada.png "),
            PathBuf::from("/photos/ada.png")
        );
        assert_eq!(
            config.resolve_image_path("/tmp/ada.png"),
            PathBuf::from("/tmp/ada.png")
        );
        assert_eq!(
            AppConfig::default().resolve_image_path("ada.png"),
            PathBuf::from("ada.png")
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        let config = AppConfig {
            log_filter: Some("register_form=debug".to_string()),
            log_file: Some(PathBuf::from("/tmp/register-form.log")),
            ingest_timeout_secs: Some(10),
            image_dir: None,
        };
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load_from(&temp_path(&dir)).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
