//! Configuration management.
//!
//! Settings come from (lowest to highest precedence) built-in defaults, a
//! TOML file, and `BOOK_SEARCH_*` environment variables. Nested keys use a
//! double underscore, e.g. `BOOK_SEARCH_CATALOG__BASE_URL` or
//! `BOOK_SEARCH_LOADING__MIN_DISPLAY_MS`.

mod file_config;

pub use file_config::{ConfigFile, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::GOOGLE_BOOKS_API_BASE;
use crate::session::{LoadingPolicy, ResolutionPolicy};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "book-search.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "BOOK_SEARCH";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog service settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Loading indicator settings
    #[serde(default)]
    pub loading: LoadingConfig,

    /// Session behavior
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// API base URL; `/volumes` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overall request timeout in seconds (unset = none)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            user_agent: None,
        }
    }
}

impl CatalogConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    GOOGLE_BOOKS_API_BASE.to_string()
}

/// Loading indicator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingConfig {
    /// Minimum time the loading indicator stays up after a successful search
    #[serde(default = "default_min_display_ms")]
    pub min_display_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            min_display_ms: default_min_display_ms(),
        }
    }
}

impl LoadingConfig {
    /// Policy for the search session
    pub fn policy(&self) -> LoadingPolicy {
        LoadingPolicy::new(Duration::from_millis(self.min_display_ms))
    }
}

fn default_min_display_ms() -> u64 {
    1000
}

/// Session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How overlapping searches are reconciled
    #[serde(default)]
    pub resolution: ResolutionPolicy,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from an optional file plus `BOOK_SEARCH_*` environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// Find a configuration file in the default locations.
///
/// Checks `./book-search.toml`, then `<config dir>/book-search/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|p| p.is_file())
}

/// Per-user configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("book-search").join("config.toml"))
}
