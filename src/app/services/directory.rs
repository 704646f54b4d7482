use std::collections::HashSet;

use tracing::debug;

use super::store::{StoreClient, StoreError};
use super::text_ops::matches_query;
use crate::app::domain::label::LabelName;

/// The set of known label names.
#[derive(Debug, Default)]
pub struct LabelDirectory {
    labels: HashSet<LabelName>,
}

impl LabelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held set wholesale with the store's listing.
    ///
    /// On failure the previous set is kept.
    pub async fn reload(&mut self, store: &dyn StoreClient) -> Result<usize, StoreError> {
        let names = store.list_labels().await?;
        self.replace(names);
        debug!(count = self.labels.len(), "label directory reloaded");
        Ok(self.labels.len())
    }

    pub fn replace(&mut self, names: impl IntoIterator<Item = LabelName>) {
        self.labels = names.into_iter().collect();
    }

    /// Add a single name, e.g. after a successful creation.
    pub fn insert(&mut self, name: LabelName) -> bool {
        self.labels.insert(name)
    }

    /// Exact-match existence check.
    pub fn contains(&self, name: &LabelName) -> bool {
        self.labels.contains(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Names whose lowercased form contains the lowercased query, sorted.
    /// An empty query yields every name.
    pub fn filtered(&self, query: &str) -> Vec<LabelName> {
        let mut matches: Vec<LabelName> = self
            .labels
            .iter()
            .filter(|name| matches_query(name.as_str(), query))
            .cloned()
            .collect();
        // Case-insensitive order with an exact tiebreak so the order is total.
        matches.sort_by_cached_key(|name| (name.folded(), name.as_str().to_owned()));
        matches
    }
}
