use super::{user_config_path, UserConfig, UserConfigError};
use std::path::Path;
use tracing::debug;

/// Load the user configuration from `~/.notebridge/config.toml`.
///
/// Returns `Ok(UserConfig::default())` if the file does not exist.
pub fn load_user_config() -> Result<UserConfig, UserConfigError> {
    load_user_config_from(&user_config_path())
}

/// Load the user configuration from an explicit path.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig, UserConfigError> {
    if !path.exists() {
        debug!("User config not found at {}; using defaults", path.display());
        return Ok(UserConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: UserConfig = toml::from_str(&content)?;
    debug!("Loaded user config from {}", path.display());
    Ok(config)
}
