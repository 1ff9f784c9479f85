//! Configuration management.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::workflow::ExecutorConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation service settings
    pub ai: AiConfig,

    /// Executor settings
    pub executor: ExecutorSettings,

    /// Storage settings
    pub storage: StorageConfig,
}

/// Generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Gemini model to use
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self { model: "gemini-2.0-flash".to_string() }
    }
}

/// Executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Maximum tasks in flight at once
    pub concurrency: usize,

    /// Pause between waves in milliseconds (rate-limit courtesy)
    pub pause_ms: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self { concurrency: 1, pause_ms: 1000 }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Project record directory (defaults to the platform data dir)
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Path to the configuration file.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("taskforge").join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save the configuration.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("No config directory available"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Translate the executor settings.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            concurrency: self.executor.concurrency.max(1),
            pause: Duration::from_millis(self.executor.pause_ms),
        }
    }

    /// Resolve the project storage directory.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("taskforge")
                .join("projects")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ai.model, "gemini-2.0-flash");
        assert_eq!(config.executor.concurrency, 1);
        assert_eq!(config.executor.pause_ms, 1000);
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[executor]\nconcurrency = 3\n").unwrap();
        assert_eq!(config.executor.concurrency, 3);
        assert_eq!(config.executor.pause_ms, 1000);
        assert_eq!(config.ai.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_executor_config_translation() {
        let mut config = Config::default();
        config.executor.concurrency = 0;
        config.executor.pause_ms = 250;

        let executor = config.executor_config();
        // Zero is clamped to sequential.
        assert_eq!(executor.concurrency, 1);
        assert_eq!(executor.pause, Duration::from_millis(250));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.storage.dir = Some(PathBuf::from("/tmp/projects"));

        let toml = toml::to_string_pretty(&config).unwrap();
        let decoded: Config = toml::from_str(&toml).unwrap();
        assert_eq!(decoded.storage.dir, config.storage.dir);
    }
}
