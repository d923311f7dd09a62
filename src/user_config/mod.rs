//! User-level configuration loaded from `~/.notebridge/config.toml`.
//!
//! The file is optional and only carries credentials, which never belong in
//! the workspace config that gets committed next to the notes:
//!
//! ```toml
//! [providers.github]
//! token_command = "pass show github/notebridge"
//! ```

mod loader;

pub use loader::{load_user_config, load_user_config_from};

use crate::utils::get_user_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("Failed to read user config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse user config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Credentials for one provider (`[providers.<name>]` table).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProviderCredentials {
    /// Literal API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Shell command printing a token on stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_command: Option<String>,
}

/// Top-level user configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderCredentials>,
}

impl UserConfig {
    /// Credentials for `provider`, empty when none are configured.
    #[must_use]
    pub fn credentials_for(&self, provider: &str) -> ProviderCredentials {
        self.providers.get(provider).cloned().unwrap_or_default()
    }
}

/// Resolve the canonical path for the user config file.
#[must_use]
pub fn user_config_path() -> PathBuf {
    get_user_dir().join("config.toml")
}

#[cfg(test)]
#[path = "user_config_tests.rs"]
mod tests;
