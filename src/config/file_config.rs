//! Configuration file support for book-search.
//!
//! Reads and writes the TOML file directly, without environment overrides.
//! Used by `book-search config init` and `book-search config show`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [catalog]
//! base_url = "https://www.googleapis.com/books/v1"
//! timeout_seconds = 30
//!
//! [loading]
//! min_display_ms = 1000
//!
//! [session]
//! resolution = "last-response-wins"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::Path;

use super::Config;

/// TOML file helpers for [`Config`]
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Config, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Config, ConfigFileError> {
        toml::from_str(content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Render configuration as TOML text
    pub fn render(config: &Config) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
        let content = Self::render(config)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
