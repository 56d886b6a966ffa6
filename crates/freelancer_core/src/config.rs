//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings for front ends.
//!
//! # Invariants
//! - Blank variables behave exactly like unset ones.
//! - Log levels are validated here so `init_logging` never sees junk.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "FREELANCER_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "FREELANCER_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "FREELANCER_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "freelancer_directory.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.variable, self.message)
    }
}

impl Error for ConfigError {}

/// Settings shared by every directory front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Normalized log level (`trace|debug|info|warn|error`).
    pub log_level: &'static str,
    /// Rolling log directory; `None` disables file logging.
    pub log_dir: Option<String>,
}

impl DirectoryConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = non_blank(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match non_blank(LOG_LEVEL_ENV) {
            Some(level) => normalize_level(&level).map_err(|message| ConfigError {
                variable: LOG_LEVEL_ENV,
                message,
            })?,
            None => default_log_level(),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir: non_blank(LOG_DIR_ENV),
        })
    }
}
