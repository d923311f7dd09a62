//! Git remote lookup and URL parsing for binding a workspace to a repository.
//!
//! Supports various URL formats including:
//! - HTTPS: `https://github.com/owner/repo.git`
//! - SSH: `git@github.com:owner/repo.git`
//! - Self-hosted: `https://git.company.com/owner/repo.git`

use super::WorkspaceError;
use std::path::Path;

const ORIGIN: &str = "origin";

/// Result of parsing a git remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRemote {
    /// The hosting platform (e.g., "github.com")
    pub host: String,
    /// The owning user or organization (first path segment)
    pub owner: String,
    /// The repository name (second path segment, without .git)
    pub repo: String,
}

impl ParsedRemote {
    /// `owner/repo`, the form the provider settings use.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Get the `origin` remote URL of the git repository containing `path`.
pub fn origin_url(path: &Path) -> Result<String, WorkspaceError> {
    let repo = git2::Repository::discover(path)?;
    let remote = repo
        .find_remote(ORIGIN)
        .map_err(|_| WorkspaceError::RemoteNotFound(ORIGIN.to_string()))?;
    remote
        .url()
        .map(str::to_string)
        .ok_or_else(|| WorkspaceError::InvalidRemoteUrl("<non-utf8>".to_string()))
}

/// Parse a git remote URL into host, owner and repository.
///
/// Supports HTTPS, HTTP, and SSH formats, including self-hosted.
/// Returns `None` if the URL format is not recognized.
#[must_use]
pub fn parse_remote_url(url: &str) -> Option<ParsedRemote> {
    let url = url.trim();
    if let Some(ssh_part) = url.strip_prefix("ssh://") {
        let ssh_part = ssh_part.strip_prefix("git@").unwrap_or(ssh_part);
        let (host, path) = ssh_part.split_once('/')?;
        let host = host.split_once(':').map_or(host, |(h, _port)| h);
        return parse_path_segments(host, path);
    }
    if let Some(ssh_part) = url.strip_prefix("git@") {
        let (host, path) = ssh_part.split_once(':')?;
        return parse_path_segments(host, path);
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let (host, path) = rest.split_once('/')?;
    let host = host.rsplit_once('@').map_or(host, |(_creds, h)| h);
    parse_path_segments(host, path)
}

fn parse_path_segments(host: &str, path: &str) -> Option<ParsedRemote> {
    let path = path.strip_suffix(".git").unwrap_or(path);
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let owner = parts.first()?;
    let repo = parts.get(1)?;
    Some(ParsedRemote {
        host: host.to_string(),
        owner: (*owner).to_string(),
        repo: (*repo).to_string(),
    })
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
