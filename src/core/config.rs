//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_API_URL: &str = "https://libretranslate.com";

/// Configuration for the translation bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Base URL of a LibreTranslate-compatible service
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    /// Idle time before an input change triggers auto-translate
    pub debounce_ms: u64,
    /// How long a translation error stays visible
    pub error_display_ms: u64,
    /// Directory holding persisted history; `None` keeps everything in memory
    pub data_dir: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_ms: 30000,
            debounce_ms: 500,
            error_display_ms: 5000,
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("nihongo-bridge"))
}

impl BridgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var("TRANSLATE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let api_key = std::env::var("TRANSLATE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        let debounce_ms = std::env::var("DEBOUNCE_MS")
            .unwrap_or_else(|_| "500".to_string())
            .parse::<u64>()?;

        let error_display_ms = std::env::var("ERROR_DISPLAY_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u64>()?;

        let data_dir = std::env::var("BRIDGE_DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(default_data_dir);

        let config = Self {
            api_url,
            api_key,
            timeout_ms,
            debounce_ms,
            error_display_ms,
            data_dir,
        };

        info!("Using translation service at {}", config.api_url);
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(anyhow::anyhow!("API URL is required"));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!("API URL must start with http:// or https://"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        if self.data_dir.is_none() {
            warn!("No data directory configured, history will not survive restarts");
        }

        Ok(())
    }

    /// Endpoint for translation requests
    pub fn translate_endpoint(&self) -> String {
        format!("{}/translate", self.api_url.trim_end_matches('/'))
    }

    /// Endpoint for language detection requests
    pub fn detect_endpoint(&self) -> String {
        format!("{}/detect", self.api_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = BridgeConfig {
            api_url: "https://translate.example.com".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let config = BridgeConfig {
            api_url: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BridgeConfig {
            api_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoints_strip_trailing_slash() {
        let config = BridgeConfig {
            api_url: "http://localhost:5000/".to_string(),
            ..Default::default()
        };

        assert_eq!(config.translate_endpoint(), "http://localhost:5000/translate");
        assert_eq!(config.detect_endpoint(), "http://localhost:5000/detect");
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.error_display(), Duration::from_secs(5));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = BridgeConfig {
            api_key: Some("secret".to_string()),
            debounce_ms: 250,
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let loaded = BridgeConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.debounce_ms, 250);
    }
}
