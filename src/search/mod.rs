// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Free-text search over the searchable paths of a schema.
//!
//! # Architecture
//!
//! ```text
//! SearchTerm + SearchablePaths
//!     ↓ compile_search
//! Query (AST)  ──AND── filter
//!     ↓ cast (against Schema)
//!     ├─→ DocumentFilter → {"$or": [{"name": {"$regex": .., "$options": "i"}}]}
//!     ├─→ SqlTranslator  → MySQL REGEXP_LIKE / JSON_EXTRACT clauses
//!     └─→ CompiledQuery  → in-memory evaluation over serde_json::Value
//! ```
//!
//! # Criteria
//!
//! A term `t` against paths `p1..pn` compiles to
//! `p1 =~ /t/i OR p2 =~ /t/i OR ... pn =~ /t/i`. A blank term or an empty
//! path set compiles to [`Query::match_all`].
//!
//! ```rust
//! use schema_search::search::{compile_search, DocumentFilter, SearchTerm};
//! use schema_search::schema::{collect_searchable_paths, FieldDef, Schema};
//! use schema_search::config::{NumericMatch, SearchConfig};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field(FieldDef::string("name"))
//!     .field(FieldDef::string("address"));
//! let paths = collect_searchable_paths(&schema, NumericMatch::Exclude);
//! let query = compile_search(&SearchTerm::from("main"), &paths, &SearchConfig::default());
//!
//! assert_eq!(
//!     DocumentFilter::render(&query),
//!     json!({"$or": [
//!         {"name": {"$regex": "main", "$options": "i"}},
//!         {"address": {"$regex": "main", "$options": "i"}}
//!     ]})
//! );
//! ```

mod cast;
mod criteria;
mod document_filter;
mod error;
mod matcher;
mod query_builder;
mod sql_translator;

pub use cast::cast;
pub use criteria::{build_pattern, compile_search, SearchTerm};
pub use document_filter::DocumentFilter;
pub use error::SearchError;
pub use matcher::{matches, values_at, CompiledQuery};
pub use query_builder::{Bound, FieldOperator, FieldQuery, Query, QueryBuilder, QueryNode, QueryValue};
pub use sql_translator::{SqlParam, SqlQuery, SqlTranslator};
