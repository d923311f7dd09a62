//! In-memory provider for reconciler and orchestrator tests.

use crate::provider::{
    Comment, FetchedItems, ItemKind, ItemState, ProviderConfig, ProviderError, RemoteItem,
    RemoteProvider,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// A recorded write or read against the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Fetch,
    Create { title: String, body: String },
    Update { id: String, state: ItemState },
    Comment { id: String, body: String },
    Get { id: String },
}

pub(crate) struct FakeProvider {
    items: Mutex<BTreeMap<String, RemoteItem>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<BTreeSet<String>>,
    failing_gets: Mutex<BTreeSet<String>>,
    incomplete: Mutex<BTreeSet<String>>,
    fetch_error: Mutex<Option<String>>,
    clock: Mutex<DateTime<Utc>>,
}

impl FakeProvider {
    pub(crate) fn new(clock: DateTime<Utc>) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(BTreeSet::new()),
            failing_gets: Mutex::new(BTreeSet::new()),
            incomplete: Mutex::new(BTreeSet::new()),
            fetch_error: Mutex::new(None),
            clock: Mutex::new(clock),
        }
    }

    pub(crate) fn put(&self, item: RemoteItem) {
        self.items.lock().unwrap().insert(item.id.clone(), item);
    }

    pub(crate) fn remove(&self, id: &str) {
        self.items.lock().unwrap().remove(id);
    }

    pub(crate) fn item(&self, id: &str) -> RemoteItem {
        self.items.lock().unwrap()[id].clone()
    }

    /// Writes and single fetches for `id` (or creates titled `id`) fail.
    pub(crate) fn fail_on(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    /// Only single fetches of `id` fail; writes still go through.
    pub(crate) fn fail_get(&self, id: &str) {
        self.failing_gets.lock().unwrap().insert(id.to_string());
    }

    /// `id` is listed by `fetch` as an item that could not be loaded.
    pub(crate) fn fail_loading(&self, id: &str) {
        self.incomplete.lock().unwrap().insert(id.to_string());
    }

    pub(crate) fn fail_fetch(&self, message: &str) {
        *self.fetch_error.lock().unwrap() = Some(message.to_string());
    }

    /// Timestamp the next remote write is stamped with.
    pub(crate) fn set_clock(&self, at: DateTime<Utc>) {
        *self.clock.lock().unwrap() = at;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, key: &str) -> Result<(), ProviderError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(ProviderError::NetworkError(format!("connection reset ({key})")));
        }
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        *self.clock.lock().unwrap()
    }
}

#[async_trait]
impl RemoteProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, _config: &ProviderConfig) -> Result<FetchedItems, ProviderError> {
        self.record(Call::Fetch);
        if let Some(message) = self.fetch_error.lock().unwrap().clone() {
            return Err(ProviderError::NetworkError(message));
        }
        let incomplete = self.incomplete.lock().unwrap().clone();
        let mut fetched = FetchedItems::default();
        for item in self.items.lock().unwrap().values() {
            if incomplete.contains(&item.id) {
                fetched
                    .failed
                    .insert(item.id.clone(), "comments unavailable".to_string());
            } else {
                fetched.items.push(item.clone());
            }
        }
        Ok(fetched)
    }

    async fn create_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError> {
        self.record(Call::Create {
            title: item.title.clone(),
            body: item.body.clone(),
        });
        self.check(&item.title)?;
        let mut items = self.items.lock().unwrap();
        let id = (items.len() + 100).to_string();
        let created = RemoteItem {
            id: id.clone(),
            url: format!("https://tracker.test/items/{id}"),
            updated_at: self.now(),
            ..item.clone()
        };
        items.insert(id, created.clone());
        Ok(created)
    }

    async fn update_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError> {
        self.record(Call::Update {
            id: item.id.clone(),
            state: item.state,
        });
        self.check(&item.id)?;
        let mut items = self.items.lock().unwrap();
        let stored = items
            .get_mut(&item.id)
            .ok_or_else(|| ProviderError::NotFound(item.id.clone()))?;
        stored.title = item.title.clone();
        stored.body = item.body.clone();
        stored.state = item.state;
        stored.updated_at = self.now();
        Ok(stored.clone())
    }

    async fn add_comment(
        &self,
        _kind: ItemKind,
        id: &str,
        body: &str,
    ) -> Result<(), ProviderError> {
        self.record(Call::Comment {
            id: id.to_string(),
            body: body.to_string(),
        });
        self.check(id)?;
        let now = self.now();
        let mut items = self.items.lock().unwrap();
        let stored = items
            .get_mut(id)
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;
        stored.comments.push(Comment {
            id: format!("c{}", stored.comments.len() + 1),
            body: body.to_string(),
            author: "me".to_string(),
            created_at: now,
        });
        stored.updated_at = now;
        Ok(())
    }

    async fn get_item(&self, _kind: ItemKind, id: &str) -> Result<RemoteItem, ProviderError> {
        self.record(Call::Get { id: id.to_string() });
        self.check(id)?;
        if self.failing_gets.lock().unwrap().contains(id) {
            return Err(ProviderError::NetworkError(format!("timed out ({id})")));
        }
        self.items
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}
