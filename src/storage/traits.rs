use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::search::Query;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The store could not evaluate the query (e.g. an invalid pattern).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Paging applied to a find, after ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    /// Maximum number of documents to return
    pub limit: Option<usize>,
    /// Number of matching documents to skip first
    pub skip: usize,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

/// The executor a search hands its combined constraint to.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, document: Document) -> Result<(), StoreError>;
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Every document satisfying `query`, paged by `options`.
    async fn find(&self, query: &Query, options: &FindOptions) -> Result<Vec<Document>, StoreError>;

    /// Number of documents satisfying `query`.
    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        Ok(self.find(query, &FindOptions::default()).await?.len())
    }

    /// Insert many documents.
    /// Default implementation falls back to sequential inserts.
    async fn insert_many(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        let written = documents.len();
        for document in documents {
            self.insert(document).await?;
        }
        Ok(written)
    }
}
