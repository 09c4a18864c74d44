//! Planner configuration
//!
//! Defaults, then `<config_dir>/tripsonality/config.toml`, then environment.

use crate::TripError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PLANNER_URL: &str = "http://localhost:8000/plan";
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:5173/";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ENV_PLANNER_URL: &str = "TRIPSONALITY_PLANNER_URL";
const ENV_TIMEOUT_SECS: &str = "TRIPSONALITY_TIMEOUT_SECS";
const ENV_SHARE_URL: &str = "TRIPSONALITY_SHARE_URL";

fn default_planner_url() -> String {
    DEFAULT_PLANNER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_share_base_url() -> String {
    DEFAULT_SHARE_BASE_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_planner_url")]
    pub planner_url: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planner_url: default_planner_url(),
            request_timeout_secs: default_timeout_secs(),
            share_base_url: default_share_base_url(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf, TripError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TripError::Config("Could not determine config directory".into()))?
            .join("tripsonality");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config file if it exists, then apply environment overrides
    pub fn load() -> Result<Self, TripError> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, TripError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| TripError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, TripError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_PLANNER_URL) {
            self.planner_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| TripError::Config(format!("{} must be a number of seconds, got {}", ENV_TIMEOUT_SECS, secs)))?;
        }
        if let Some(url) = lookup(ENV_SHARE_URL) {
            self.share_base_url = url;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.planner_url, "http://localhost:8000/plan");
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "planner_url = \"https://planner.example/plan\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.planner_url, "https://planner.example/plan");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = \"soon\"\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(TripError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TRIPSONALITY_PLANNER_URL", "http://10.0.0.2:8000/plan"),
            ("TRIPSONALITY_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.planner_url, "http://10.0.0.2:8000/plan");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
    }

    #[test]
    fn test_bad_timeout_override() {
        let result = Config::default().with_overrides(|key| (key == "TRIPSONALITY_TIMEOUT_SECS").then(|| "abc".to_string()));
        assert!(result.is_err());
    }
}
