use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Setting naming the local note type remote issues are stored as.
pub const ISSUES_TYPE_KEY: &str = "issuesType";
/// Setting naming the local note type remote pull requests are stored as.
pub const PRS_TYPE_KEY: &str = "prsType";
/// Setting binding the provider to a repository (`owner/repo`).
pub const REPO_KEY: &str = "repo";
/// Setting overriding the API base URL (self-hosted trackers).
pub const BASE_URL_KEY: &str = "baseUrl";

/// The kind of tracker entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pull_request",
        }
    }

    /// The provider setting that maps this kind to a local note type.
    #[must_use]
    pub fn type_setting(self) -> &'static str {
        match self {
            ItemKind::Issue => ISSUES_TYPE_KEY,
            ItemKind::PullRequest => PRS_TYPE_KEY,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a tracker entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
    Merged,
}

impl ItemState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemState::Open => "open",
            ItemState::Closed => "closed",
            ItemState::Merged => "merged",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment on a remote item. Immutable once created remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of one tracker entity at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Unique per provider and kind (e.g. "42" for GitHub issue #42)
    pub id: String,
    pub kind: ItemKind,
    pub title: String,
    pub body: String,
    pub state: ItemState,
    pub url: String,
    pub labels: BTreeSet<String>,
    pub assignees: BTreeSet<String>,
    pub milestone: Option<String>,
    pub updated_at: DateTime<Utc>,
    /// Chronological; the remote side only appends
    pub comments: Vec<Comment>,
}

impl RemoteItem {
    /// A not-yet-created item, as handed to `create_item`.
    #[must_use]
    pub fn draft(kind: ItemKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            title: title.into(),
            body: body.into(),
            state: ItemState::Open,
            url: String::new(),
            labels: BTreeSet::new(),
            assignees: BTreeSet::new(),
            milestone: None,
            updated_at: Utc::now(),
            comments: Vec::new(),
        }
    }
}

/// What a provider fetch returned.
///
/// `failed` holds items the provider listed but could not load completely,
/// keyed by id, with the error message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedItems {
    pub items: Vec<RemoteItem>,
    pub failed: BTreeMap<String, String>,
}

impl From<Vec<RemoteItem>> for FetchedItems {
    fn from(items: Vec<RemoteItem>) -> Self {
        Self {
            items,
            failed: BTreeMap::new(),
        }
    }
}

/// One configured provider for a workspace.
///
/// `settings` is a flat string map; a kind without a local type mapping is
/// not synced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Registered adapter name (e.g., "github")
    pub name: String,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_setting(mut self, key: &str, value: impl Into<String>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    /// A non-empty setting value.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The local note type a remote kind maps to, if that kind is synced.
    #[must_use]
    pub fn local_type_for(&self, kind: ItemKind) -> Option<&str> {
        self.setting(kind.type_setting())
    }

    #[must_use]
    pub fn syncs(&self, kind: ItemKind) -> bool {
        self.local_type_for(kind).is_some()
    }
}
