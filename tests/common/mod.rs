//! Common test utilities
#![allow(clippy::expect_used)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use notebridge::provider::ISSUES_TYPE_KEY;
use notebridge::{
    write_config, Comment, FetchedItems, ItemKind, ItemState, ProviderConfig, ProviderError,
    ProviderRegistry, RemoteItem, RemoteProvider, WorkspaceConfig,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Name the in-memory tracker is registered under.
pub const TRACKER: &str = "tracker";

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A fixed point in time, `hour` hours into 2024-05-01.
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Write `.notebridge/config.json` with the in-memory tracker mapped to `issue`.
pub async fn init_workspace(root: &Path, extra: Vec<ProviderConfig>) {
    let mut providers = vec![ProviderConfig::new(TRACKER).with_setting(ISSUES_TYPE_KEY, "issue")];
    providers.extend(extra);
    write_config(root, &WorkspaceConfig { providers })
        .await
        .expect("Failed to write config");
}

/// In-memory tracker state shared between the test and the provider.
#[derive(Default)]
pub struct Tracker {
    items: Mutex<BTreeMap<String, RemoteItem>>,
    comments_posted: Mutex<Vec<(String, String)>>,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl Tracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open_issue(&self, id: &str, title: &str, updated_at: DateTime<Utc>) {
        let item = RemoteItem {
            id: id.to_string(),
            kind: ItemKind::Issue,
            title: title.to_string(),
            body: format!("{title} body"),
            state: ItemState::Open,
            url: format!("https://tracker.test/{id}"),
            labels: BTreeSet::new(),
            assignees: BTreeSet::new(),
            milestone: None,
            updated_at,
            comments: Vec::new(),
        };
        self.items.lock().expect("lock").insert(id.to_string(), item);
    }

    #[allow(dead_code)]
    pub fn set_clock(&self, now: DateTime<Utc>) {
        *self.clock.lock().expect("lock") = Some(now);
    }

    #[allow(dead_code)]
    pub fn comments_posted(&self) -> Vec<(String, String)> {
        self.comments_posted.lock().expect("lock").clone()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.lock().expect("lock").unwrap_or_else(Utc::now)
    }
}

/// Register `tracker` in `registry` under [`TRACKER`].
pub fn register(registry: &mut ProviderRegistry, tracker: &Arc<Tracker>) {
    let tracker = Arc::clone(tracker);
    registry.register(TRACKER, move |_setup| {
        Ok(Box::new(TrackerProvider(Arc::clone(&tracker))) as Box<dyn RemoteProvider>)
    });
}

struct TrackerProvider(Arc<Tracker>);

impl TrackerProvider {
    fn get(&self, id: &str) -> Result<RemoteItem, ProviderError> {
        self.0
            .items
            .lock()
            .expect("lock")
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl RemoteProvider for TrackerProvider {
    fn provider_name(&self) -> &str {
        TRACKER
    }

    async fn fetch(&self, config: &ProviderConfig) -> Result<FetchedItems, ProviderError> {
        let items: Vec<RemoteItem> = self
            .0
            .items
            .lock()
            .expect("lock")
            .values()
            .filter(|item| config.syncs(item.kind))
            .cloned()
            .collect();
        Ok(items.into())
    }

    async fn create_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError> {
        let mut items = self.0.items.lock().expect("lock");
        let id = (items.len() + 1).to_string();
        let created = RemoteItem {
            id: id.clone(),
            url: format!("https://tracker.test/{id}"),
            updated_at: self.0.now(),
            ..item.clone()
        };
        items.insert(id, created.clone());
        Ok(created)
    }

    async fn update_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError> {
        let now = self.0.now();
        let mut items = self.0.items.lock().expect("lock");
        let stored = items
            .get_mut(&item.id)
            .ok_or_else(|| ProviderError::NotFound(item.id.clone()))?;
        stored.state = item.state;
        stored.updated_at = now;
        Ok(stored.clone())
    }

    async fn add_comment(
        &self,
        _kind: ItemKind,
        id: &str,
        body: &str,
    ) -> Result<(), ProviderError> {
        let now = self.0.now();
        {
            let mut items = self.0.items.lock().expect("lock");
            let stored = items
                .get_mut(id)
                .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;
            stored.comments.push(Comment {
                id: format!("{id}-{}", stored.comments.len() + 1),
                body: body.to_string(),
                author: "tester".to_string(),
                created_at: now,
            });
            stored.updated_at = now;
        }
        self.0
            .comments_posted
            .lock()
            .expect("lock")
            .push((id.to_string(), body.to_string()));
        Ok(())
    }

    async fn get_item(&self, _kind: ItemKind, id: &str) -> Result<RemoteItem, ProviderError> {
        self.get(id)
    }
}
