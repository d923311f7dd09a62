//! Workspace configuration stored in `.notebridge/config.json`.
//!
//! ```json
//! {
//!   "providers": [
//!     { "name": "github", "settings": { "issuesType": "issue", "repo": "acme/notes" } }
//!   ]
//! }
//! ```

use crate::provider::ProviderConfig;
use crate::utils::{atomic_write, get_config_path};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Notebridge workspace configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Configured providers, synced in this order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl WorkspaceConfig {
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}

/// Read the configuration file; a missing file is an empty configuration.
pub async fn read_config(workspace_root: &Path) -> Result<WorkspaceConfig, ConfigError> {
    let config_path = get_config_path(workspace_root);
    if !config_path.exists() {
        debug!(
            "No config at {}; no providers configured",
            config_path.display()
        );
        return Ok(WorkspaceConfig::default());
    }
    let content = fs::read_to_string(&config_path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the configuration file.
pub async fn write_config(
    workspace_root: &Path,
    config: &WorkspaceConfig,
) -> Result<(), ConfigError> {
    let config_path = get_config_path(workspace_root);
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    atomic_write(&config_path, &content).await?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
