//! Configuration Module
//!
//! Handles application configuration loading, validation, and management.

use crate::detection::{NodePair, DEFAULT_CANDIDATE_PAIRS};
use crate::error::LrDetectError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Analysis backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Mock detection settings
    #[serde(default)]
    pub detection: DetectionConfig,
}

/// Analysis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL; `/get_values` is appended (default: "http://localhost:8000")
    #[serde(default = "default_backend_url")]
    pub base_url: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Suspected-node selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Candidate (node1, node2) pairs; one is picked uniformly at random
    #[serde(default = "default_candidate_pairs")]
    pub candidate_pairs: Vec<NodePair>,
}

fn default_candidate_pairs() -> Vec<NodePair> {
    DEFAULT_CANDIDATE_PAIRS.to_vec()
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            candidate_pairs: default_candidate_pairs(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.config/lrdetect/config.toml
    /// 3. Local config: ./lrdetect.toml
    /// 4. Environment variables
    ///
    /// Files are merged key by key, so a local file that sets only one key
    /// keeps every other value from the system file.
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let layers: Vec<PathBuf> = Self::system_config_path()
            .into_iter()
            .chain(std::iter::once(Self::local_config_path()))
            .collect();

        let mut config = Self::from_layers(&layers)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Get the system config path: ~/.config/lrdetect/config.toml
    pub fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lrdetect").join("config.toml"))
    }

    /// Get the local config path: ./lrdetect.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./lrdetect.toml")
    }

    /// Parse a TOML file; sections it omits keep their defaults
    fn from_file(path: &Path) -> Result<Self> {
        Self::from_layers(&[path.to_path_buf()])
    }

    /// Merge the existing files in `paths` (later wins per key), then
    /// deserialize once so unset keys fall back to defaults
    fn from_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();

        for path in paths.iter().filter(|path| path.exists()) {
            tracing::debug!("Loading config layer from: {:?}", path);
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let layer: toml::Table = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            merge_tables(&mut merged, layer);
        }

        toml::Value::Table(merged)
            .try_into::<Self>()
            .context("Failed to parse merged configuration")
    }

    /// Apply `LRDETECT_*` overrides read through `lookup`
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LRDETECT_BACKEND_URL") {
            self.backend.base_url = url;
        }

        if let Some(level) = lookup("LRDETECT_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(dir) = lookup("LRDETECT_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(dir));
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(LrDetectError::Config(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let url = self.backend.base_url.trim();
        if url.is_empty() {
            return Err(LrDetectError::Config("Backend base_url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LrDetectError::Config(format!(
                "Backend base_url must start with http:// or https://: {}",
                url
            )));
        }

        if self.detection.candidate_pairs.is_empty() {
            return Err(LrDetectError::Config(
                "detection.candidate_pairs must list at least one node pair".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}

/// Recursively overlay `layer` onto `base`. Nested tables merge; any other
/// value replaces the one below it.
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.detection.candidate_pairs, vec![NodePair::new(8, 32)]);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.backend.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        config.backend.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_candidates() {
        let mut config = Config::default();
        config.detection.candidate_pairs.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);
        assert!(err.to_string().contains("candidate_pairs"));
    }

    #[test]
    fn test_local_layer_keeps_system_values() {
        let dir = TempDir::new().unwrap();
        let system = dir.path().join("config.toml");
        let local = dir.path().join("lrdetect.toml");
        fs::write(
            &system,
            "[backend]\nbase_url = \"http://grid-backend:9000\"\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();
        fs::write(&local, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = Config::from_layers(&[system, local]).unwrap();
        assert_eq!(config.backend.base_url, "http://grid-backend:9000");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.detection.candidate_pairs, vec![NodePair::new(8, 32)]);
    }

    #[test]
    fn test_missing_layers_are_skipped() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("lrdetect.toml");
        fs::write(&local, "[detection]\ncandidate_pairs = [[3, 7]]\n").unwrap();

        let config = Config::from_layers(&[dir.path().join("absent.toml"), local]).unwrap();
        assert_eq!(config.detection.candidate_pairs, vec![NodePair::new(3, 7)]);
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_merge_tables_replaces_non_table_values() {
        let mut base: toml::Table = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let layer: toml::Table = toml::from_str("a = 5\n[t]\ny = 9\n").unwrap();
        merge_tables(&mut base, layer);

        assert_eq!(base["a"].as_integer(), Some(5));
        assert_eq!(base["t"]["x"].as_integer(), Some(1));
        assert_eq!(base["t"]["y"].as_integer(), Some(9));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
[backend]
base_url = "https://grid.example.org"

[logging]
level = "debug"

[detection]
candidate_pairs = [[8, 32], [12, 25]]
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.backend.base_url, "https://grid.example.org");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.detection.candidate_pairs,
            vec![NodePair::new(8, 32), NodePair::new(12, 25)]
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.detection.candidate_pairs.len(), 1);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.backend.base_url = "http://10.0.0.5:9000".to_string();

        config.save(temp_file.path()).unwrap();
        let loaded = Config::load_from_path(temp_file.path()).unwrap();

        assert_eq!(loaded.logging.level, config.logging.level);
        assert_eq!(loaded.detection.candidate_pairs, config.detection.candidate_pairs);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        assert!(Config::load_from_path("/definitely/not/here/lrdetect.toml").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LRDETECT_BACKEND_URL", "http://backend:8000"),
            ("LRDETECT_LOG_LEVEL", "trace"),
        ]);
        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://backend:8000");
        assert_eq!(config.logging.level, "trace");
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_system_config_path() {
        let path = Config::system_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("lrdetect"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_local_config_path() {
        assert_eq!(Config::local_config_path(), PathBuf::from("./lrdetect.toml"));
    }
}
