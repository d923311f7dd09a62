//! Workspace resolution.
//!
//! A workspace is a directory containing a `.notebridge/` folder. Notes live
//! in type folders directly below the workspace root.

mod remote;

pub use remote::{origin_url, parse_remote_url, ParsedRemote};

use crate::utils::{get_config_path, get_notebridge_path};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("No notebridge workspace found at or above {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Git error: {0}")]
    GitError(#[from] git2::Error),

    #[error("Remote '{0}' not found")]
    RemoteNotFound(String),

    #[error("Invalid remote URL format: {0}")]
    InvalidRemoteUrl(String),
}

/// A resolved workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Use `root` as a workspace without searching parents.
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk up from `start` to the first directory holding a `.notebridge/` folder.
    pub fn resolve(start: &Path) -> Result<Self, WorkspaceError> {
        let start = start.canonicalize()?;
        start
            .ancestors()
            .find(|dir| get_notebridge_path(dir).is_dir())
            .map(Self::at)
            .ok_or_else(|| WorkspaceError::NotFound(start.display().to_string()))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        get_config_path(&self.root)
    }

    /// The repository the workspace's `origin` remote points at.
    pub fn origin_repo(&self) -> Result<ParsedRemote, WorkspaceError> {
        let url = origin_url(&self.root)?;
        parse_remote_url(&url).ok_or(WorkspaceError::InvalidRemoteUrl(url))
    }
}
