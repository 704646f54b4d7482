//! Remote store clients.
//!
//! The sync controller only ever talks to the store through [`StoreClient`].
//! Two implementations are provided:
//! - [`HttpStoreClient`] for the store-viewer HTTP API
//! - [`MemoryStore`] an in-process store used by tests and the `--memory` mode

mod http;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::app::domain::label::{LabelContent, LabelName};

pub use http::HttpStoreClient;
pub use memory::{MemoryStore, StoreCall};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The label vanished between listing and fetch/write.
    #[error("Label not found: {0}")]
    NotFound(String),

    /// Creation conflict. Routed into the open-existing decision.
    #[error("Label already exists: {0}")]
    AlreadyExists(String),

    /// Network or server failure.
    #[error("Store unavailable: {0}")]
    RemoteUnavailable(String),
}

/// Capability to list, fetch, create and overwrite labels.
///
/// Calls may suspend. Ordering between calls is only what the caller imposes.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn list_labels(&self) -> Result<Vec<LabelName>, StoreError>;

    async fn fetch_label(&self, name: &LabelName) -> Result<LabelContent, StoreError>;

    /// Newly created labels are always text.
    async fn create_label(&self, name: &LabelName, initial_text: &str) -> Result<(), StoreError>;

    /// Unconditional overwrite, last write wins.
    async fn write_label(&self, name: &LabelName, text: &str) -> Result<(), StoreError>;
}
