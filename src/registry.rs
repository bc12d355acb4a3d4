// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Registry of searchable models by name.
//!
//! # Example
//!
//! ```rust
//! use schema_search::{FieldDef, ModelRegistry, Schema, SearchConfig};
//!
//! let registry = ModelRegistry::new();
//! registry.register(
//!     "article",
//!     Schema::new().field(FieldDef::string("title").searchable()),
//!     SearchConfig::default(),
//! );
//!
//! let article = registry.model("article").unwrap();
//! assert_eq!(article.searchable_fields(), vec!["title"]);
//! assert!(registry.model("comment").is_err());
//! ```
//!
//! # Design
//!
//! - **Register once**: paths are collected when a model is registered and
//!   shared behind an `Arc` afterwards
//! - **Replace on re-register**: registering an existing name swaps in a
//!   freshly collected model; holders of the old `Arc` keep the old one
//! - **Thread-safe**: Uses `parking_lot::RwLock` for concurrent access

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::SearchConfig;
use crate::model::SearchableModel;
use crate::schema::Schema;
use crate::search::SearchError;

/// Thread-safe map from model name to its registered search bundle.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<SearchableModel>>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under `name`, replacing any previous registration.
    pub fn register(&self, name: &str, schema: Schema, config: SearchConfig) -> Arc<SearchableModel> {
        let model = Arc::new(SearchableModel::register(name, schema, config));
        if self
            .models
            .write()
            .insert(name.to_string(), Arc::clone(&model))
            .is_some()
        {
            debug!(model = %name, "Replaced registered model");
        }
        model
    }

    /// Look up a model, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<SearchableModel>> {
        self.models.read().get(name).cloned()
    }

    /// Look up a model, failing with [`SearchError::UnknownModel`].
    pub fn model(&self, name: &str) -> Result<Arc<SearchableModel>, SearchError> {
        self.get(name)
            .ok_or_else(|| SearchError::UnknownModel(name.to_string()))
    }

    /// Remove a model. Returns `true` if it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.models.write().remove(name).is_some()
    }

    /// Registered model names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    pub fn clear(&self) {
        self.models.write().clear();
    }
}
