//! Process configuration resolved from environment variables.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - Resolution never fails; invalid values surface when they are used.

use rusqlite::Connection;
use std::path::PathBuf;
use taskhub_core::db::open_db;
use taskhub_core::logging::LoggingError;
use taskhub_core::{default_log_level, init_logging, DbError};

pub const DB_PATH_ENV: &str = "TASKHUB_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKHUB_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKHUB_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "taskhub.sqlite3";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskhubConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl TaskhubConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: non_blank(LOG_LEVEL_ENV)
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_blank(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when file logging is disabled.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }

    /// Opens and migrates the configured database.
    pub fn open_db(&self) -> Result<Connection, DbError> {
        open_db(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskhubConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn explicit_values_are_trimmed_and_used() {
        let config = TaskhubConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /var/lib/taskhub/db.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/taskhub"),
        ]));

        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/taskhub/db.sqlite3")
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/taskhub")));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = TaskhubConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, "   "),
            (LOG_DIR_ENV, ""),
        ]));

        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("taskhub.sqlite3")
        );
        assert_eq!(config.log_level, taskhub_core::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn logging_is_skipped_without_log_dir() {
        let config = TaskhubConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.init_logging(), Ok(false));
    }
}
