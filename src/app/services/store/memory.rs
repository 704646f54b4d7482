use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{StoreClient, StoreError};
use crate::app::domain::label::{LabelContent, LabelName};
use crate::app::services::text_ops::is_text_content;

/// One call received by a [`MemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Fetch(String),
    Create { name: String, content: String },
    Write { name: String, content: String },
}

#[derive(Default)]
struct Inner {
    labels: HashMap<String, Vec<u8>>,
    journal: Vec<StoreCall>,
    unavailable: bool,
    fail_writes: bool,
}

/// In-process store keeping raw bytes per label.
///
/// Every call is journaled, which is what the tests assert against. The
/// remote can be taken offline, writes can be made to fail, and each call
/// can be delayed to simulate a slow server.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with text labels.
    pub fn with_labels<'a>(labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (name, text) in labels {
            store.insert_bytes(name, text.as_bytes().to_vec());
        }
        store
    }

    /// Delay every call by `latency` before it takes effect.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_bytes(&self, name: &str, bytes: Vec<u8>) {
        self.lock().labels.insert(name.to_string(), bytes);
    }

    /// Remove a label behind the client's back.
    pub fn remove(&self, name: &str) {
        self.lock().labels.remove(name);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Current stored text of a label, if it exists and is UTF-8.
    pub fn text_of(&self, name: &str) -> Option<String> {
        let inner = self.lock();
        let bytes = inner.labels.get(name)?;
        String::from_utf8(bytes.clone()).ok()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().journal.clone()
    }

    /// Contents of every write call, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.lock()
            .journal
            .iter()
            .filter_map(|call| match call {
                StoreCall::Write { name, content } => Some((name.clone(), content.clone())),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Journal the call, then check the remote is reachable.
    fn record(&self, call: StoreCall) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.lock();
        debug!(?call, "memory store call");
        inner.journal.push(call);
        if inner.unavailable {
            return Err(StoreError::RemoteUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(inner)
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn list_labels(&self) -> Result<Vec<LabelName>, StoreError> {
        self.delay().await;
        let inner = self.record(StoreCall::List)?;
        Ok(inner
            .labels
            .keys()
            .filter_map(|name| LabelName::new(name.as_str()).ok())
            .collect())
    }

    async fn fetch_label(&self, name: &LabelName) -> Result<LabelContent, StoreError> {
        self.delay().await;
        let inner = self.record(StoreCall::Fetch(name.to_string()))?;
        let bytes = inner
            .labels
            .get(name.as_str())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        if is_text_content(bytes) {
            match std::str::from_utf8(bytes) {
                Ok(text) => Ok(LabelContent::text(text)),
                Err(_) => Ok(LabelContent::binary(bytes.len() as u64)),
            }
        } else {
            Ok(LabelContent::binary(bytes.len() as u64))
        }
    }

    async fn create_label(&self, name: &LabelName, initial_text: &str) -> Result<(), StoreError> {
        self.delay().await;
        let mut inner = self.record(StoreCall::Create {
            name: name.to_string(),
            content: initial_text.to_string(),
        })?;
        if inner.labels.contains_key(name.as_str()) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        inner
            .labels
            .insert(name.to_string(), initial_text.as_bytes().to_vec());
        Ok(())
    }

    async fn write_label(&self, name: &LabelName, text: &str) -> Result<(), StoreError> {
        self.delay().await;
        let mut inner = self.record(StoreCall::Write {
            name: name.to_string(),
            content: text.to_string(),
        })?;
        if inner.fail_writes {
            return Err(StoreError::RemoteUnavailable(
                "write rejected by server".to_string(),
            ));
        }
        match inner.labels.get_mut(name.as_str()) {
            Some(bytes) => {
                *bytes = text.as_bytes().to_vec();
                Ok(())
            }
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> LabelName {
        LabelName::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_classifies_content() {
        let store = MemoryStore::with_labels([("a.txt", "x")]);
        store.insert_bytes("logo.png", vec![0x89, 0x50, 0x4e, 0x47, 0x00, 0x00]);

        let text = store.fetch_label(&label("a.txt")).await.unwrap();
        assert_eq!(text, LabelContent::text("x"));

        let binary = store.fetch_label(&label("logo.png")).await.unwrap();
        assert_eq!(binary, LabelContent::binary(6));
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.fetch_label(&label("nope")).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("nope".to_string()));
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let store = MemoryStore::with_labels([("a.txt", "x")]);
        let err = store.create_label(&label("a.txt"), "").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.text_of("a.txt").as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_write_overwrites_and_is_journaled() {
        let store = MemoryStore::with_labels([("a.txt", "x")]);
        store.write_label(&label("a.txt"), "xy").await.unwrap();
        assert_eq!(store.text_of("a.txt").as_deref(), Some("xy"));
        assert_eq!(
            store.writes(),
            vec![("a.txt".to_string(), "xy".to_string())]
        );
    }

    #[tokio::test]
    async fn test_write_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.write_label(&label("gone"), "x").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_offline_store() {
        let store = MemoryStore::with_labels([("a.txt", "x")]);
        store.set_unavailable(true);
        assert!(matches!(
            store.list_labels().await,
            Err(StoreError::RemoteUnavailable(_))
        ));
        // Failed calls are still journaled
        assert_eq!(store.calls(), vec![StoreCall::List]);

        store.set_unavailable(false);
        assert_eq!(store.list_labels().await.unwrap(), vec![label("a.txt")]);
    }
}
