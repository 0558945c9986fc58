//! # Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--db`, `--per-page`)
//! 2. Environment variables (`TIJORI_*`)
//! 3. Defaults (this file)
//!
//! ## Environment Variables
//! - `TIJORI_DB_PATH`: database file (default: platform data directory)
//! - `TIJORI_PAGE_SIZE`: rows per listing page (default: 10, max 200)
//! - `TIJORI_LABEL_HEADER`: first line printed on every barcode label
//! - `TIJORI_LOG`: tracing filter, takes precedence over `RUST_LOG`

use directories::ProjectDirs;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use tijori_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Header printed above each barcode when none is configured.
pub const DEFAULT_LABEL_HEADER: &str = "TIJORI";

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "tijori.db";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine app data directory; set TIJORI_DB_PATH")]
    NoDataDir,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Explicit database path. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Rows per listing page
    pub page_size: u32,

    /// First line of every barcode label
    pub label_header: String,

    /// Tracing filter directive from `TIJORI_LOG`
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            label_header: DEFAULT_LABEL_HEADER.to_string(),
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from `TIJORI_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, one call per variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = non_empty(lookup("TIJORI_DB_PATH")) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = non_empty(lookup("TIJORI_PAGE_SIZE")) {
            config.page_size = parse_page_size("TIJORI_PAGE_SIZE", &raw)?;
        }

        if let Some(header) = non_empty(lookup("TIJORI_LABEL_HEADER")) {
            config.label_header = header;
        }

        config.log_filter = non_empty(lookup("TIJORI_LOG"));

        Ok(config)
    }

    /// Applies a `--db` override.
    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.db_path = path;
        }
        self
    }

    /// Resolves the database file, creating the data directory when the
    /// platform default is used.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.tijori.backoffice/tijori.db`
    /// - **Windows**: `%APPDATA%\tijori\backoffice\data\tijori.db`
    /// - **Linux**: `~/.local/share/backoffice/tijori.db`
    pub fn database_path(&self) -> Result<PathBuf, crate::error::AppError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("com", "tijori", "backoffice").ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DATABASE_FILE))
    }
}

/// Parses a page size, accepting 1..=MAX_PAGE_SIZE.
pub fn parse_page_size(key: &str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => Ok(size),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
