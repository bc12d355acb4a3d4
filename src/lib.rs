//! # Schema Search
//!
//! Free-text search over the fields of a schema that opted into it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Registration (once)                       │
//! │  • Schema walked depth-first                               │
//! │  • Searchable text paths collected, deduplicated           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                     (SearchablePaths, shared)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Search (per call)                         │
//! │  • Term compiled to OR of /term/i over every path          │
//! │  • Filter and criteria cast against the schema             │
//! │  • Filter AND criteria                                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               (SearchQuery: chain, or execute now)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   DocumentStore                             │
//! │  • InMemoryStore evaluates queries in process              │
//! │  • DocumentFilter / SqlTranslator render for other stores  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use schema_search::{Document, FieldDef, InMemoryStore, Schema, SearchableModel, SearchConfig};
//! use schema_search::storage::DocumentStore;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sister = Arc::new(Schema::new().field(FieldDef::string("name").searchable()));
//!     let schema = Schema::new()
//!         .field(FieldDef::string("address").searchable())
//!         .field(FieldDef::number("age"))
//!         .field(FieldDef::nested_array("sisters", sister));
//!
//!     let people = SearchableModel::register("person", schema, SearchConfig::default());
//!
//!     let store = InMemoryStore::new();
//!     store
//!         .insert(Document::new("p1", json!({
//!             "address": "123 Main Street",
//!             "age": 30,
//!             "sisters": [{"name": "Amy"}, {"name": "Zoe"}]
//!         })))
//!         .await
//!         .expect("insert");
//!
//!     people
//!         .search_with("amy", None, &store, |result| match result {
//!             Ok(found) => println!("Found {} people", found.len()),
//!             Err(e) => eprintln!("Search failed: {}", e),
//!         })
//!         .await;
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`SearchConfig`] for the numeric and pattern policies.
//!
//! ## Modules
//!
//! - [`schema`]: Field definitions and searchable path collection
//! - [`search`]: Query AST, criteria compilation, casting, rendering, matching
//! - [`model`]: Registered models and chainable searches
//! - [`registry`]: Models by name
//! - [`storage`]: The store seam and the in-memory store
//! - [`metrics`]: Counters and histograms via the `metrics` crate

pub mod config;
pub mod document;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod schema;
pub mod search;
pub mod storage;

pub use config::{MatchMode, NumericMatch, SearchConfig};
pub use document::Document;
pub use model::{SearchQuery, SearchableModel};
pub use registry::ModelRegistry;
pub use schema::{collect_searchable_paths, FieldDef, FieldType, PathKind, Schema, SearchablePath, SearchablePaths};
pub use search::{compile_search, DocumentFilter, Query, QueryBuilder, SearchError, SearchTerm, SqlTranslator};
pub use storage::{DocumentStore, FindOptions, InMemoryStore, StoreError};
pub use crate::metrics::LatencyTimer;
