//! Configuration module for trackvault.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/trackvault.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the blob storage directory.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Base URL under which stored blobs are publicly reachable.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_storage_path() -> String {
    "data/blobs".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:9000/blobs".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Library behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Timezone for displaying dates (e.g., "Asia/Tokyo", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Maximum size of a single uploaded file in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_max_upload_size() -> u64 {
    50
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/trackvault.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Library behavior.
    #[serde(default)]
    pub library: LibraryConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TRACKVAULT_PUBLIC_URL`: Override the public base URL of the blob store
    pub fn apply_env_overrides(&mut self) {
        if let Ok(public_url) = std::env::var("TRACKVAULT_PUBLIC_URL") {
            if !public_url.is_empty() {
                self.storage.public_base_url = public_url;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The display timezone is not a known IANA timezone
    /// - The upload size cap is zero
    /// - The public base URL is empty
    pub fn validate(&self) -> Result<()> {
        if self.library.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(VaultError::Validation(format!(
                "unknown timezone: {}",
                self.library.timezone
            )));
        }
        if self.library.max_upload_size_mb == 0 {
            return Err(VaultError::Validation(
                "max_upload_size_mb must be at least 1".to_string(),
            ));
        }
        if self.storage.public_base_url.trim().is_empty() {
            return Err(VaultError::Validation(
                "storage.public_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
