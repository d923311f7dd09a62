//! Local notes: Markdown files with YAML frontmatter, grouped by type folder.
//!
//! A note is bound to a remote item through the `remote` frontmatter key:
//!
//! ```yaml
//! remote:
//!   provider: github
//!   id: '42'
//!   url: https://github.com/acme/notes/issues/42
//!   state: open
//!   updatedAt: 2024-05-01T10:00:00Z
//!   labels: [bug]
//!   assignees: []
//! ```

mod fs_store;

pub use fs_store::FsNoteStore;

use crate::common::FrontmatterError;
use crate::provider::{ItemState, RemoteItem};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Frontmatter key holding the [`RemoteLinkage`].
pub const REMOTE_KEY: &str = "remote";

#[derive(Error, Debug)]
pub enum NoteStoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Frontmatter error in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("Invalid remote linkage in {path}: {message}")]
    InvalidLinkage { path: String, message: String },

    #[error("Invalid note type: {0}")]
    InvalidType(String),

    #[error("Note not found: {0}")]
    NotFound(String),
}

/// The last-synced projection of a remote item, stored in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLinkage {
    pub provider: String,
    pub id: String,
    #[serde(default)]
    pub url: String,
    pub state: ItemState,
    /// Remote `updatedAt` as of the last sync; doubles as the last-sync time.
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub assignees: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
}

impl RemoteLinkage {
    /// Project a fetched item into linkage metadata.
    #[must_use]
    pub fn from_item(provider: &str, item: &RemoteItem) -> Self {
        Self {
            provider: provider.to_string(),
            id: item.id.clone(),
            url: item.url.clone(),
            state: item.state,
            updated_at: item.updated_at,
            labels: item.labels.clone(),
            assignees: item.assignees.clone(),
            milestone: item.milestone.clone(),
        }
    }
}

/// A file-backed note as seen by the sync engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalNote {
    /// Owned by the note store; callers never build these paths.
    pub path: PathBuf,
    pub title: String,
    pub note_type: String,
    pub archived: bool,
    pub linkage: Option<RemoteLinkage>,
    /// Filesystem mtime, the authoritative "changed locally" signal
    pub file_modified_at: DateTime<Utc>,
}

impl LocalNote {
    /// The linkage if it belongs to `provider`.
    #[must_use]
    pub fn linkage_for(&self, provider: &str) -> Option<&RemoteLinkage> {
        self.linkage.as_ref().filter(|l| l.provider == provider)
    }
}

/// Which notes `list_notes` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub include_archived: bool,
    pub include_artifacts: bool,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            include_archived: true,
            include_artifacts: false,
        }
    }
}

/// A note file that could not be interpreted.
///
/// `provider` and `remote_id` are filled in when the linkage could be partly
/// recovered, so the reconciler can attribute the failure to an id and avoid
/// creating a duplicate note for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableNote {
    pub path: PathBuf,
    pub provider: Option<String>,
    pub remote_id: Option<String>,
    pub error: String,
}

/// Result of scanning the workspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteListing {
    pub notes: Vec<LocalNote>,
    pub unreadable: Vec<UnreadableNote>,
}

/// Storage primitives the sync engine needs from the local side.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Every note in the workspace matching `filter`.
    async fn list_notes(&self, filter: ListFilter) -> Result<NoteListing, NoteStoreError>;

    /// The body of a note, without frontmatter.
    async fn read_body(&self, path: &Path) -> Result<String, NoteStoreError>;

    async fn read_note(&self, path: &Path) -> Result<LocalNote, NoteStoreError>;

    /// Create a note of `note_type` carrying `linkage` and `body`.
    async fn create_note_with_content(
        &self,
        note_type: &str,
        title: &str,
        linkage: &RemoteLinkage,
        body: &str,
    ) -> Result<LocalNote, NoteStoreError>;

    /// Replace the linkage and body of an existing note. Other frontmatter
    /// keys are kept as they are.
    async fn update_note_with_content(
        &self,
        path: &Path,
        linkage: &RemoteLinkage,
        body: &str,
    ) -> Result<(), NoteStoreError>;

    /// Set the note's modification time to now, so the next pass sees it as
    /// edited locally.
    async fn mark_modified(&self, path: &Path) -> Result<(), NoteStoreError>;
}
