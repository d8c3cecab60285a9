//! Application configuration

use anyhow::Context;
use app_store::S3Settings;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection: S3Settings,
    pub preview: PreviewConfig,
    pub transfer: TransferConfig,
    pub logging: LoggingConfig,
}

/// Text preview of file objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Bytes read from the start of an object
    pub max_bytes: usize,
    /// WHATWG encoding label used to decode the bytes
    pub encoding: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            encoding: "utf-8".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Objects moved in parallel by upload/download
    pub concurrency: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Rolled log files older than this are removed at startup
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { retention_days: 7 }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one the per-user `config.toml` is
    /// used when present, defaults otherwise. `AWS_*` environment variables
    /// fill connection fields the file leaves empty.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration {}", path.display()))?;
        tracing::info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    /// Fill empty connection fields from `AWS_*` variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let conn = &mut self.connection;

        if conn.access_key_id.is_empty() {
            if let Some(value) = get("AWS_ACCESS_KEY_ID") {
                conn.access_key_id = value;
            }
        }
        if conn.secret_access_key.is_empty() {
            if let Some(value) = get("AWS_SECRET_ACCESS_KEY") {
                conn.secret_access_key = value;
            }
        }
        if conn.session_token.is_none() {
            conn.session_token = get("AWS_SESSION_TOKEN");
        }
        if conn.endpoint_url.is_none() {
            conn.endpoint_url = get("AWS_ENDPOINT_URL_S3").or_else(|| get("AWS_ENDPOINT_URL"));
        }
        if conn.region.trim().is_empty() || conn.region == S3Settings::default().region {
            if let Some(region) = get("AWS_REGION").or_else(|| get("AWS_DEFAULT_REGION")) {
                conn.region = region;
            }
        }
    }

    /// Get the per-user configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("io", "s3browser", "s3browser")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}
