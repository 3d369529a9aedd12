//! Runtime configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local use. Values
//! given on the command line override these in the CLI.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::persistence::DEFAULT_STORAGE_KEY;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATA_DIR: &str = "MAPTY_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "MAPTY_LOG_LEVEL";
pub const ENV_STORAGE_KEY: &str = "MAPTY_STORAGE_KEY";

/// Data directory used when `MAPTY_DATA_DIR` is unset, relative to the working directory.
const DEFAULT_DATA_DIR_NAME: &str = ".mapty";
const DB_FILE_NAME: &str = "mapty.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Absolute directory holding the database and logs.
    pub data_dir: PathBuf,
    /// Normalized log level (`trace|debug|info|warn|error`).
    pub log_level: &'static str,
    /// Key of the workout blob inside the key-value store.
    pub storage_key: String,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Self::from_lookup(|name| std::env::var(name).ok(), &cwd)
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Relative data directories are resolved against `cwd`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cwd: &Path,
    ) -> Result<Self, ConfigError> {
        let data_dir = match non_blank(lookup(ENV_DATA_DIR)) {
            Some(value) => cwd.join(value),
            None => cwd.join(DEFAULT_DATA_DIR_NAME),
        };

        let log_level = match non_blank(lookup(ENV_LOG_LEVEL)) {
            Some(value) => normalize_level(&value).map_err(|_| ConfigError::InvalidValue {
                name: ENV_LOG_LEVEL,
                value,
            })?,
            None => default_log_level(),
        };

        let storage_key = non_blank(lookup(ENV_STORAGE_KEY))
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            data_dir,
            log_level,
            storage_key,
        })
    }

    /// SQLite file backing the key-value store.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Directory receiving rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { name: &'static str, value: String },
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, value } => {
                write!(f, "invalid value `{value}` for {name}")
            }
            Self::CurrentDir(err) => write!(f, "cannot resolve working directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}
