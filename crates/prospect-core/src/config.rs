//! Configuration management for Prospect.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/prospect/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote API client settings
    pub api: ApiConfig,
    /// Crawl behavior settings
    pub crawl: CrawlConfig,
    /// Local persistence settings
    pub storage: StorageConfig,
    /// Output sink settings
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `PROSPECT_API_BASE_URL`: Override the remote API base URL
    /// - `PROSPECT_API_USERNAME`: Override the API account username
    /// - `PROSPECT_DB_PATH`: Override the sqlite database path
    ///
    /// The API password is never stored in the config file; it is read
    /// separately from `PROSPECT_API_PASSWORD` at client construction.
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("PROSPECT_API_BASE_URL") {
            if !val.is_empty() {
                config.api.base_url = val;
                tracing::debug!("Override api.base_url from env");
            }
        }

        if let Ok(val) = std::env::var("PROSPECT_API_USERNAME") {
            if !val.is_empty() {
                config.api.username = val;
                tracing::debug!("Override api.username from env");
            }
        }

        if let Ok(val) = std::env::var("PROSPECT_DB_PATH") {
            if !val.is_empty() {
                config.storage.database_path = PathBuf::from(val);
                tracing::debug!("Override storage.database_path from env");
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/prospect/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "prospect", "prospect").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/prospect`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "prospect", "prospect").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Remote API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the remote search/enrich API
    pub base_url: String,
    /// Account username for the credential handshake
    pub username: String,
    /// Fixed delay between remote calls in milliseconds
    pub call_delay_ms: u64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retry budget for 401/429 handling on a single call
    pub max_retries: u32,
    /// Fallback sleep in seconds when a 429 carries no retry-after
    pub rate_limit_fallback_secs: u64,
    /// Minutes a freshly issued credential is considered valid.
    /// Deliberately shorter than the provider's stated 60-minute lifetime.
    pub token_valid_minutes: i64,
    /// Minutes between proactive background credential renewals
    pub renew_interval_minutes: u64,
    /// Warn when the provider's remaining-quota header drops below this
    pub low_quota_warning: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.example-leads.com/v2".to_string(),
            username: String::new(),
            call_delay_ms: 1200,
            timeout_secs: 30,
            max_retries: 3,
            rate_limit_fallback_secs: 60,
            token_valid_minutes: 40,
            renew_interval_minutes: 40,
            low_quota_warning: 100,
        }
    }
}

/// Crawl behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Page size for company search requests
    pub page_size: u32,
    /// Absolute per-combination page ceiling, guards against a persistently
    /// failing endpoint
    pub max_pages: u32,
    /// Consecutive pages with zero new companies before pagination stops early
    pub stale_page_limit: u32,
    /// Seconds between background progress autosaves
    pub autosave_interval_secs: u64,
    /// Minimum contact-match confidence requested from the provider (0-100)
    pub min_confidence: u32,
    /// Whether to exclude partial contact profiles from search results
    pub exclude_partial_profiles: bool,
    /// Page size for contact search requests
    pub contact_page_size: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            max_pages: 50,
            stale_page_limit: 3,
            autosave_interval_secs: 30,
            min_confidence: 85,
            exclude_partial_profiles: true,
            contact_page_size: 10,
        }
    }
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the sqlite database holding exclusions, checkpoints, and the
    /// cached credential
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("prospect.db"),
        }
    }
}

/// Output sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory where the CSV sink writes companies.csv / contacts.csv
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}
