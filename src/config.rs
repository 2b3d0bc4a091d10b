// src/config.rs
// Runtime configuration: where data lives and what name to start with

use crate::session::DEFAULT_USER_NAME;
use std::path::PathBuf;

pub const DB_FILE_NAME: &str = "expense-tracker.db";
pub const LOG_FILE_NAME: &str = "expense-tracker.log";
const APP_DIR: &str = "expense-tracker";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Explicit database path; None means the platform data directory
    pub db_path: Option<PathBuf>,

    /// Keep everything in memory, nothing survives the process
    pub memory: bool,

    /// Name used until one is saved
    pub initial_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            memory: false,
            initial_name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

impl Config {
    /// Database file to open
    ///
    /// Order: explicit path, `<data_dir>/expense-tracker/expense-tracker.db`,
    /// then the current directory when no data directory is known.
    pub fn resolve_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        match dirs::data_dir() {
            Some(dir) => dir.join(APP_DIR).join(DB_FILE_NAME),
            None => PathBuf::from(DB_FILE_NAME),
        }
    }

    /// Log file written while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        let db_path = self.resolve_db_path();
        match db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(LOG_FILE_NAME),
            _ => PathBuf::from(LOG_FILE_NAME),
        }
    }
}
