//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `GLYCOCHECK_DB_PATH` | `glycocheck.db` |
//! | `GLYCOCHECK_SESSION_FILE` | `.glycocheck_session.json` |
//! | `GLYCOCHECK_HISTORY_LIMIT` | `12` |
//! | `GLYCOCHECK_LOG_MODE` | `auto` (`file`, `stderr`) |
//! | `GLYCOCHECK_LOG_FILE` | `glycocheck.log` |
//!
//! Command-line flags override the database and session paths.

use std::path::PathBuf;

use serde::Serialize;

pub const DB_PATH_ENV: &str = "GLYCOCHECK_DB_PATH";
pub const SESSION_FILE_ENV: &str = "GLYCOCHECK_SESSION_FILE";
pub const HISTORY_LIMIT_ENV: &str = "GLYCOCHECK_HISTORY_LIMIT";
pub const LOG_MODE_ENV: &str = "GLYCOCHECK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "GLYCOCHECK_LOG_FILE";

/// Where log output goes. Stdout is reserved for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Stderr; same as `Stderr` for the CLI.
    Auto,
    File,
    Stderr,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stderr" | "stdout" => Self::Stderr,
            _ => Self::Auto,
        }
    }

    #[must_use]
    pub fn uses_file(&self) -> bool {
        matches!(self, Self::File)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub db_path: PathBuf,
    pub session_file: PathBuf,
    pub history_limit: usize,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("glycocheck.db"),
            session_file: PathBuf::from(".glycocheck_session.json"),
            history_limit: 12,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("glycocheck.log"),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    ///
    /// Unparseable or empty values fall back to defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            db_path: get(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from),
            session_file: get(SESSION_FILE_ENV).map_or(defaults.session_file, PathBuf::from),
            history_limit: get(HISTORY_LIMIT_ENV)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.history_limit),
            log_mode: get(LOG_MODE_ENV).map_or(defaults.log_mode, |v| LogMode::parse(&v)),
            log_file: get(LOG_FILE_ENV).map_or(defaults.log_file, PathBuf::from),
        }
    }
}
