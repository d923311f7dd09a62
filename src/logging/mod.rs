//! Tracing setup: a rolling log file plus stderr, so stdout stays free for
//! sync reports.

mod init;

pub use init::{init_logging, parse_rotation};

use crate::utils::get_user_dir;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::rolling::Rotation;

/// Log filename used by the CLI.
pub const LOG_FILENAME: &str = "notebridge.log";

/// Global log file path, set once at startup.
static LOG_FILE_PATH: OnceLock<String> = OnceLock::new();

/// Store the log file path for later retrieval (e.g., in error hints).
pub fn set_log_file_path(path: String) {
    let _ = LOG_FILE_PATH.set(path);
}

/// Get the log file path set at startup.
pub fn get_log_file_path() -> &'static str {
    LOG_FILE_PATH.get().map_or("", String::as_str)
}

/// Configuration for the logging system.
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub log_level: Level,
    pub json_format: bool,
    pub rotation: Rotation,
}

impl LogConfig {
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILENAME)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: get_user_dir().join("logs"),
            log_level: Level::INFO,
            json_format: false,
            rotation: Rotation::DAILY,
        }
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod logging_tests;
