//! One reconciliation pass for one provider.
//!
//! Remote items and linked notes are matched by remote id. For each id:
//!
//! - both sides: compare the note's mtime with the item's `updatedAt`
//!   - remote newer and advanced past the stored linkage: pull
//!   - local newer: push the local region as a comment, or self-heal
//!   - equal: nothing to do
//! - remote only: create a note if the kind maps to a local type
//! - local only: nothing to do (deletions are not propagated)
//! - listed by the provider but not loadable: failed, the note is left alone
//!
//! A failure on one id is recorded in the report and the pass moves on.

use super::merge::{build_body, publishable_text, split_body, MergeError};
use super::report::{Outcome, Report, ReportBuilder};
use crate::note::{
    ListFilter, LocalNote, NoteStore, NoteStoreError, RemoteLinkage, UnreadableNote,
};
use crate::provider::{
    ItemKind, ItemState, ProviderConfig, ProviderError, RemoteItem, RemoteProvider,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Note store error: {0}")]
    Store(#[from] NoteStoreError),

    #[error("{0}")]
    Merge(#[from] MergeError),

    #[error("Remote item could not be loaded: {0}")]
    Incomplete(String),

    #[error("Linked from more than one note: {0}")]
    DuplicateLinkage(String),

    #[error("Unreadable note {path}: {error}")]
    Unreadable { path: String, error: String },

    #[error("Note {path} is already linked to {provider} item {id}")]
    AlreadyLinked {
        path: String,
        provider: String,
        id: String,
    },

    #[error("Provider '{provider}' does not sync {kind} items")]
    KindNotSynced { provider: String, kind: ItemKind },
}

/// A linked note together with its linkage for the current provider.
type Linked<'n> = (&'n LocalNote, &'n RemoteLinkage);

/// Reconciles one provider's items with the workspace notes.
pub struct Reconciler<'a> {
    provider: &'a dyn RemoteProvider,
    store: &'a dyn NoteStore,
    config: &'a ProviderConfig,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(
        provider: &'a dyn RemoteProvider,
        store: &'a dyn NoteStore,
        config: &'a ProviderConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    /// Run one pass. Only a failure to fetch either side is returned as an
    /// error; everything per id ends up in the report.
    pub async fn run(&self) -> Result<Report, SyncError> {
        let fetched = self.provider.fetch(self.config).await?;
        let listing = self.store.list_notes(ListFilter::default()).await?;
        let mut report = ReportBuilder::new(self.name());

        let remote: BTreeMap<&str, &RemoteItem> = fetched
            .items
            .iter()
            .map(|item| (item.id.as_str(), item))
            .collect();

        let mut local: BTreeMap<&str, Vec<Linked<'_>>> = BTreeMap::new();
        for note in &listing.notes {
            if let Some(linkage) = note.linkage_for(self.name()) {
                local
                    .entry(linkage.id.as_str())
                    .or_default()
                    .push((note, linkage));
            }
        }

        let mut unreadable: BTreeMap<&str, &UnreadableNote> = BTreeMap::new();
        for note in &listing.unreadable {
            match (note.provider.as_deref(), note.remote_id.as_deref()) {
                (Some(provider), Some(id)) if provider == self.name() => {
                    unreadable.insert(id, note);
                }
                (Some(provider), _) if provider != self.name() => {}
                _ => {
                    warn!("Unreadable note {}: {}", note.path.display(), note.error);
                    report.fail(format!("{}: {}", note.path.display(), note.error));
                }
            }
        }

        let ids: BTreeSet<&str> = remote
            .keys()
            .chain(local.keys())
            .chain(unreadable.keys())
            .copied()
            .chain(fetched.failed.keys().map(String::as_str))
            .collect();

        for id in ids {
            let notes = local.get(id).map(Vec::as_slice).unwrap_or_default();
            let incomplete = fetched.failed.get(id);
            let result = match (incomplete, unreadable.get(id), remote.get(id), notes) {
                (Some(message), _, _, _) => Err(SyncError::Incomplete(message.clone())),
                (None, Some(bad), _, _) => Err(SyncError::Unreadable {
                    path: bad.path.display().to_string(),
                    error: bad.error.clone(),
                }),
                (None, None, _, [_, _, ..]) => Err(SyncError::DuplicateLinkage(
                    notes
                        .iter()
                        .map(|(note, _)| note.path.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                )),
                (None, None, Some(item), [linked]) => self.resolve(item, *linked).await,
                (None, None, Some(item), []) => self.create(item).await,
                (None, None, None, _) => Ok(Outcome::Unchanged),
            };

            match result {
                Ok(outcome) => {
                    debug!("{} {id}: {outcome:?}", self.name());
                    report.record(outcome);
                }
                Err(e) => {
                    warn!("{} {id}: {e}", self.name());
                    report.fail(format!("{id}: {e}"));
                }
            }
        }

        let report = report.finish();
        info!("{report}");
        Ok(report)
    }

    /// Both sides present: decide by timestamps.
    async fn resolve(&self, item: &RemoteItem, linked: Linked<'_>) -> Result<Outcome, SyncError> {
        let (note, linkage) = linked;
        match note.file_modified_at.cmp(&item.updated_at) {
            Ordering::Less if item.updated_at > linkage.updated_at => {
                self.pull(item, note, linkage).await
            }
            Ordering::Less | Ordering::Equal => Ok(Outcome::Unchanged),
            Ordering::Greater => self.push(item, note, linkage).await,
        }
    }

    /// Rebuild the synced region from `item`, keeping the local region.
    async fn pull(
        &self,
        item: &RemoteItem,
        note: &LocalNote,
        linkage: &RemoteLinkage,
    ) -> Result<Outcome, SyncError> {
        let body = self.store.read_body(&note.path).await?;
        let split = split_body(&body)?;
        self.write(note, item, linkage, split.local).await?;
        Ok(Outcome::Updated)
    }

    /// Local file is newer: post a pending local region as a comment, or
    /// self-heal the synced region when there is nothing to post.
    async fn push(
        &self,
        item: &RemoteItem,
        note: &LocalNote,
        linkage: &RemoteLinkage,
    ) -> Result<Outcome, SyncError> {
        let body = self.store.read_body(&note.path).await?;
        let split = split_body(&body)?;

        let current = match self.push_state(item, linkage).await? {
            Some(updated) => updated,
            None => item.clone(),
        };

        let pending = split.local.trim();
        if pending.is_empty() {
            self.write(note, &current, linkage, split.local).await?;
            return Ok(Outcome::Updated);
        }

        self.provider
            .add_comment(item.kind, &item.id, pending)
            .await?;
        match self.provider.get_item(item.kind, &item.id).await {
            Ok(refreshed) => {
                self.write(note, &refreshed, linkage, "").await?;
                Ok(Outcome::Updated)
            }
            Err(e) => {
                // The comment is posted; drop it from the local region so it
                // is not posted twice. The next pass pulls it back in.
                self.write(note, &current, linkage, "").await?;
                Err(e.into())
            }
        }
    }

    /// Push a state edited in the note's linkage. Only applies while the
    /// remote has not moved since the last sync; merged is never pushed.
    async fn push_state(
        &self,
        item: &RemoteItem,
        linkage: &RemoteLinkage,
    ) -> Result<Option<RemoteItem>, SyncError> {
        let edited_locally = linkage.state != item.state
            && linkage.updated_at >= item.updated_at
            && linkage.state != ItemState::Merged
            && item.state != ItemState::Merged;
        if !edited_locally {
            return Ok(None);
        }
        debug!(
            "{} {}: pushing state {} -> {}",
            self.name(),
            item.id,
            item.state,
            linkage.state
        );
        let mut desired = item.clone();
        desired.state = linkage.state;
        Ok(Some(self.provider.update_item(&desired).await?))
    }

    /// Remote only: create a note when the kind maps to a local type.
    async fn create(&self, item: &RemoteItem) -> Result<Outcome, SyncError> {
        let Some(note_type) = self.config.local_type_for(item.kind) else {
            debug!("{} {}: no local type for {}", self.name(), item.id, item.kind);
            return Ok(Outcome::Skipped);
        };
        let body = build_body(item, None, "");
        let linkage = RemoteLinkage::from_item(self.name(), item);
        self.store
            .create_note_with_content(note_type, &item.title, &linkage, &body)
            .await?;
        Ok(Outcome::Created)
    }

    async fn write(
        &self,
        note: &LocalNote,
        item: &RemoteItem,
        previous: &RemoteLinkage,
        local_region: &str,
    ) -> Result<(), SyncError> {
        let body = build_body(item, Some(previous.updated_at), local_region);
        let linkage = RemoteLinkage::from_item(self.name(), item);
        self.store
            .update_note_with_content(&note.path, &linkage, &body)
            .await?;
        self.keep_pending(&note.path, local_region).await
    }

    /// Keep a note that still holds text to post newer than its item.
    async fn keep_pending(&self, path: &Path, local_region: &str) -> Result<(), SyncError> {
        if !local_region.trim().is_empty() {
            self.store.mark_modified(path).await?;
        }
        Ok(())
    }

    /// Create a remote issue from an unlinked note and link the note to it.
    pub async fn publish(&self, path: &Path) -> Result<LocalNote, SyncError> {
        let note = self.store.read_note(path).await?;
        if let Some(linkage) = &note.linkage {
            return Err(SyncError::AlreadyLinked {
                path: path.display().to_string(),
                provider: linkage.provider.clone(),
                id: linkage.id.clone(),
            });
        }
        if !self.config.syncs(ItemKind::Issue) {
            return Err(SyncError::KindNotSynced {
                provider: self.name().to_string(),
                kind: ItemKind::Issue,
            });
        }

        let body = self.store.read_body(path).await?;
        let local_region = split_body(&body).map_or("", |split| split.local);
        let draft = RemoteItem::draft(ItemKind::Issue, note.title.clone(), publishable_text(&body));
        let created = self.provider.create_item(&draft).await?;
        info!(
            "Published {} as {} item {}",
            path.display(),
            self.name(),
            created.id
        );

        let rebuilt = build_body(&created, None, local_region);
        let linkage = RemoteLinkage::from_item(self.name(), &created);
        self.store
            .update_note_with_content(path, &linkage, &rebuilt)
            .await?;
        self.keep_pending(path, local_region).await?;
        self.store.read_note(path).await.map_err(SyncError::from)
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
