//! Remote tracker providers.
//!
//! The reconciler only talks to a tracker through [`RemoteProvider`]; adapters
//! are registered by name in a [`ProviderRegistry`].

mod error;
pub mod github;
mod registry;
mod types;

pub use error::ProviderError;
pub use github::GitHubProvider;
pub use registry::{ProviderFactory, ProviderRegistry, ProviderSetup};
pub use types::{
    Comment, FetchedItems, ItemKind, ItemState, ProviderConfig, RemoteItem, BASE_URL_KEY,
    ISSUES_TYPE_KEY, PRS_TYPE_KEY, REPO_KEY,
};

use async_trait::async_trait;

/// Capability interface every tracker adapter implements.
///
/// Calls are plain request/response: no retry, no backoff. Timeouts are the
/// adapter's business.
#[async_trait]
pub trait RemoteProvider: Send + Sync {
    /// Provider name (e.g., "github")
    fn provider_name(&self) -> &str;

    /// Fetch every item of interest for the workspace binding. Kinds the
    /// config does not map to a local type may be left out. An error here
    /// aborts the pass; an item that fails on its own goes into
    /// [`FetchedItems::failed`].
    async fn fetch(&self, config: &ProviderConfig) -> Result<FetchedItems, ProviderError>;

    /// Create a remote entity and return its canonical representation.
    async fn create_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError>;

    /// Push title, body and state; returns the freshly fetched item.
    async fn update_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError>;

    /// Append a comment. Callers re-fetch to observe it.
    async fn add_comment(&self, kind: ItemKind, id: &str, body: &str)
        -> Result<(), ProviderError>;

    /// Fetch a single item by identifier.
    async fn get_item(&self, kind: ItemKind, id: &str) -> Result<RemoteItem, ProviderError>;
}
