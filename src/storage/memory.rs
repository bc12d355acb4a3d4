use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::traits::{DocumentStore, FindOptions, StoreError};
use crate::document::Document;
use crate::search::{CompiledQuery, Query};

/// DashMap-backed store that evaluates queries in process.
///
/// Results are ordered by document id so paging is stable.
pub struct InMemoryStore {
    data: DashMap<String, Document>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Get current document count
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all documents
    pub fn clear(&self) {
        self.data.clear();
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, document: Document) -> Result<(), StoreError> {
        self.data.insert(document.id.clone(), document);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.data.get(id).map(|r| r.value().clone()))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.data.remove(id);
        Ok(())
    }

    async fn find(&self, query: &Query, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        let compiled = CompiledQuery::compile(query).map_err(|e| StoreError::InvalidQuery(e.to_string()))?;

        let mut hits: Vec<Document> = self
            .data
            .iter()
            .filter(|entry| compiled.matches(&entry.value().content))
            .map(|entry| entry.value().clone())
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));

        let total = hits.len();
        let page: Vec<Document> = hits
            .into_iter()
            .skip(options.skip)
            .take(options.limit.unwrap_or(usize::MAX))
            .collect();

        debug!(matched = total, returned = page.len(), "In-memory find");
        Ok(page)
    }
}
