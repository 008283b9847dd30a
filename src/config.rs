//! Runtime configuration
//!
//! Every field has a working default, so `SurveyConfig::default()` is enough
//! for embedding. With the `config-file` feature the settings can also come
//! from a `radiolog.toml` file or `RADIOLOG_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings for one survey session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Directory under which the export folder is created
    pub export_root: PathBuf,
    /// Directory for persisted collections; in-memory only when unset
    pub store_dir: Option<PathBuf>,
    /// Beacon sampling period in milliseconds
    pub beacon_sample_interval_ms: u64,
    /// WiFi sampling period in milliseconds
    pub wifi_sample_interval_ms: u64,
    /// Identifier echoed back with permission outcomes
    pub permission_request_id: u32,
    /// Buffered user-facing notices before lagging subscribers drop them
    pub notice_capacity: usize,
    /// Minimum seconds between automatic store saves
    pub auto_save_interval_secs: u64,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            export_root: PathBuf::from("."),
            store_dir: None,
            beacon_sample_interval_ms: 1_000,
            wifi_sample_interval_ms: 3_000,
            permission_request_id: 0,
            notice_capacity: 16,
            auto_save_interval_secs: 5,
        }
    }
}

impl SurveyConfig {
    pub fn beacon_sample_interval(&self) -> Duration {
        Duration::from_millis(self.beacon_sample_interval_ms)
    }

    pub fn wifi_sample_interval(&self) -> Duration {
        Duration::from_millis(self.wifi_sample_interval_ms)
    }

    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_secs)
    }

    /// Load settings from `radiolog.*` and the `RADIOLOG_` environment
    ///
    /// Missing files fall back to defaults; a malformed file is an error.
    #[cfg(feature = "config-file")]
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("radiolog").required(false))
            .add_source(config::Environment::with_prefix("RADIOLOG").try_parsing(true))
            .build()
            .map_err(|e| ConfigError::Load(format!("Failed to read configuration: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("Invalid configuration: {}", e)))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = SurveyConfig::default();

        assert!(config.store_dir.is_none());
        assert_eq!(config.beacon_sample_interval(), Duration::from_millis(1_000));
        assert_eq!(config.wifi_sample_interval(), Duration::from_millis(3_000));
        assert_eq!(config.auto_save_interval(), Duration::from_secs(5));
        assert_eq!(config.permission_request_id, 0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: SurveyConfig =
            serde_json::from_str(r#"{"beacon_sample_interval_ms": 250}"#).unwrap();

        assert_eq!(config.beacon_sample_interval(), Duration::from_millis(250));
        assert_eq!(config.wifi_sample_interval(), Duration::from_millis(3_000));
        assert_eq!(config.notice_capacity, 16);
    }

    #[test]
    #[cfg(feature = "config-file")]
    fn test_load_layers_env_over_defaults() {
        // No radiolog.* file ships with the crate, so this load is pure defaults
        let config = SurveyConfig::load().unwrap();
        assert_eq!(config.beacon_sample_interval_ms, 1_000);
        assert!(config.store_dir.is_none());

        std::env::set_var("RADIOLOG_BEACON_SAMPLE_INTERVAL_MS", "250");
        let layered = SurveyConfig::load();
        std::env::remove_var("RADIOLOG_BEACON_SAMPLE_INTERVAL_MS");

        let layered = layered.unwrap();
        assert_eq!(layered.beacon_sample_interval_ms, 250);
        assert_eq!(layered.wifi_sample_interval_ms, 3_000);
    }
}
