//! Credential resolution for the GitHub adapter.

use super::super::ProviderError;
use crate::user_config::ProviderCredentials;
use tracing::debug;

/// Environment variable holding a personal access token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const GH_TOKEN_COMMAND: &str = "gh auth token";

/// How the adapter authenticates against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredentials {
    /// Personal Access Token
    PersonalAccessToken { token: String },
    /// CLI tool command printing a token (e.g., "gh auth token")
    CliTool { command: String },
    /// No authentication (public access only)
    None,
}

/// Pick credentials: `GITHUB_TOKEN`, then the user config token, then the
/// configured token command, then `gh auth token` when `gh` is installed.
#[must_use]
pub fn resolve_credentials(configured: &ProviderCredentials) -> AuthCredentials {
    let env_token = std::env::var(TOKEN_ENV).ok();
    let gh_available = which::which("gh").is_ok();
    resolve_credentials_from(env_token, configured, gh_available)
}

pub(crate) fn resolve_credentials_from(
    env_token: Option<String>,
    configured: &ProviderCredentials,
    gh_available: bool,
) -> AuthCredentials {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(token) = non_empty(&env_token).or_else(|| non_empty(&configured.token)) {
        return AuthCredentials::PersonalAccessToken { token };
    }
    if let Some(command) = non_empty(&configured.token_command) {
        return AuthCredentials::CliTool { command };
    }
    if gh_available {
        return AuthCredentials::CliTool {
            command: GH_TOKEN_COMMAND.to_string(),
        };
    }
    AuthCredentials::None
}

/// Run a token command and return its trimmed stdout.
pub async fn run_token_command(command: &str) -> Result<String, ProviderError> {
    debug!("Obtaining GitHub token via `{command}`");
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .await
        .map_err(|e| ProviderError::AuthenticationFailed(e.to_string()))?;

    if !output.status.success() {
        return Err(ProviderError::AuthenticationFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(ProviderError::AuthenticationFailed(format!(
            "`{command}` printed no token"
        )));
    }
    Ok(token)
}
