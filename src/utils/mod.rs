mod atomic;

pub use atomic::{atomic_write, atomic_write_stamped};

use std::path::{Path, PathBuf};

/// The name of the per-workspace folder holding notebridge state
pub const NOTEBRIDGE_FOLDER: &str = ".notebridge";

/// The name of the workspace configuration file inside [`NOTEBRIDGE_FOLDER`]
pub const CONFIG_FILE: &str = "config.json";

/// Get the path to the .notebridge folder
#[must_use]
pub fn get_notebridge_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(NOTEBRIDGE_FOLDER)
}

/// Get the path to the workspace config file
#[must_use]
pub fn get_config_path(workspace_root: &Path) -> PathBuf {
    get_notebridge_path(workspace_root).join(CONFIG_FILE)
}

/// Get the user-level notebridge directory (`~/.notebridge`)
#[must_use]
pub fn get_user_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(NOTEBRIDGE_FOLDER)
}

/// Get current timestamp in ISO 8601 format
#[must_use]
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Format a path for display, replacing home directory with ~/
#[must_use]
pub fn format_display_path(path: &str) -> String {
    replace_homedir::replace_homedir(path, "~")
}

#[cfg(test)]
#[path = "utils_tests.rs"]
mod tests;
