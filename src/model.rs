// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Searchable models.
//!
//! [`SearchableModel::register`] runs once per model: it collects the
//! searchable paths of an immutable schema and keeps them with the schema and
//! its [`SearchConfig`]. Every later search reuses that path set.
//!
//! A search compiles the term into criteria, casts both the caller's filter
//! and the criteria against the schema, and ANDs them. The result is either
//! executed right away against a [`DocumentStore`] or returned as a
//! [`SearchQuery`] for further chaining.
//!
//! ```rust
//! use schema_search::{Document, FieldDef, InMemoryStore, Query, Schema, SearchableModel, SearchConfig};
//! use schema_search::storage::DocumentStore;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::new()
//!     .field(FieldDef::string("address").searchable())
//!     .field(FieldDef::number("age"));
//! let people = SearchableModel::register("person", schema, SearchConfig::default());
//! assert_eq!(people.searchable_fields(), vec!["address"]);
//!
//! let store = InMemoryStore::new();
//! store.insert(Document::new("p1", json!({"address": "123 Main Street", "age": 30}))).await?;
//!
//! let found = people.search_exec("MAIN", None, &store).await?;
//! assert_eq!(found.len(), 1);
//!
//! let chained = people
//!     .search("main", None)?
//!     .and(Query::numeric_range("age", Some(40.0), None))?
//!     .exec(&store)
//!     .await?;
//! assert!(chained.is_empty());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::document::Document;
use crate::metrics::{self, LatencyTimer};
use crate::schema::{collect_searchable_paths, Schema, SearchablePaths};
use crate::search::{cast, compile_search, DocumentFilter, Query, SearchError, SearchTerm, SqlQuery, SqlTranslator};
use crate::storage::{DocumentStore, FindOptions};

/// A schema registered for search, with its searchable paths computed once.
#[derive(Debug, Clone)]
pub struct SearchableModel {
    name: String,
    schema: Arc<Schema>,
    config: SearchConfig,
    paths: Arc<SearchablePaths>,
}

impl SearchableModel {
    /// Register `schema` under `name`, collecting its searchable paths.
    pub fn register(name: impl Into<String>, schema: Schema, config: SearchConfig) -> Self {
        let name = name.into();
        let paths = collect_searchable_paths(&schema, config.numeric_match);

        info!(
            model = %name,
            paths = paths.len(),
            numeric_match = ?config.numeric_match,
            match_mode = ?config.match_mode,
            "Registered searchable model"
        );
        metrics::record_registration(&name, paths.len());

        Self {
            name,
            schema: Arc::new(schema),
            config,
            paths: Arc::new(paths),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The searchable dotted paths, in collection order.
    #[must_use]
    pub fn searchable_fields(&self) -> Vec<&str> {
        self.paths.fields()
    }

    #[must_use]
    pub fn searchable_paths(&self) -> &SearchablePaths {
        &self.paths
    }

    /// Compile a term into this model's criteria, without casting.
    pub fn criteria(&self, term: impl Into<SearchTerm>) -> Query {
        compile_search(&term.into(), &self.paths, &self.config)
    }

    /// Build a not-yet-executed search.
    ///
    /// The filter and the criteria are each cast against the schema; the first
    /// failure is returned and nothing is built. A blank term applies only the
    /// filter; no filter applies only the criteria.
    pub fn search(&self, term: impl Into<SearchTerm>, filter: Option<&Query>) -> Result<SearchQuery, SearchError> {
        let query = self.prepare(term.into(), filter).map_err(|e| {
            metrics::record_query_built(&self.name, "error");
            e
        })?;
        metrics::record_query_built(&self.name, "success");
        Ok(query)
    }

    /// Like [`search`](Self::search), with the filter given as a filter document.
    pub fn search_document(&self, term: impl Into<SearchTerm>, filter: &Value) -> Result<SearchQuery, SearchError> {
        let filter = DocumentFilter::parse(filter)?;
        self.search(term, Some(&filter))
    }

    /// Build and execute a search.
    pub async fn search_exec<S>(
        &self,
        term: impl Into<SearchTerm>,
        filter: Option<&Query>,
        store: &S,
    ) -> Result<Vec<Document>, SearchError>
    where
        S: DocumentStore + ?Sized,
    {
        let query = self.prepare(term.into(), filter).map_err(|e| {
            metrics::record_search(&self.name, "exec", "error");
            e
        })?;
        query.run(store, "exec").await
    }

    /// Build and execute a search, delivering the outcome to `callback`.
    ///
    /// The callback runs exactly once: with the construction error, the
    /// execution error, or the results. Nothing is returned to the caller.
    pub async fn search_with<S, F>(&self, term: impl Into<SearchTerm>, filter: Option<&Query>, store: &S, callback: F)
    where
        S: DocumentStore + ?Sized,
        F: FnOnce(Result<Vec<Document>, SearchError>),
    {
        let outcome = match self.prepare(term.into(), filter) {
            Ok(query) => query.run(store, "callback").await,
            Err(e) => {
                metrics::record_search(&self.name, "callback", "error");
                Err(e)
            }
        };
        callback(outcome);
    }

    fn prepare(&self, term: SearchTerm, filter: Option<&Query>) -> Result<SearchQuery, SearchError> {
        match self.build(&term, filter) {
            Ok(query) => Ok(SearchQuery::new(self.name.clone(), Arc::clone(&self.schema), query)),
            Err(e) => {
                warn!(model = %self.name, error = %e, "Search construction failed");
                if e.is_cast() {
                    metrics::record_cast_failure(&self.name);
                }
                Err(e)
            }
        }
    }

    fn build(&self, term: &SearchTerm, filter: Option<&Query>) -> Result<Query, SearchError> {
        let filter = match filter {
            Some(filter) => cast(filter, &self.schema)?,
            None => Query::match_all(),
        };

        let criteria = compile_search(term, &self.paths, &self.config);
        metrics::record_criteria_leaves(&self.name, criteria.leaf_count());
        let criteria = cast(&criteria, &self.schema)?;

        debug!(
            model = %self.name,
            filtered = !filter.is_match_all(),
            criteria_leaves = criteria.leaf_count(),
            "Built search"
        );
        Ok(filter.and(criteria))
    }
}

/// A constructed search that has not run yet.
///
/// Chain further constraints with [`and`](Self::and), page with
/// [`limit`](Self::limit) and [`skip`](Self::skip), then run it with
/// [`exec`](Self::exec) or [`exec_with`](Self::exec_with).
#[derive(Debug, Clone)]
pub struct SearchQuery {
    model: String,
    schema: Arc<Schema>,
    query: Query,
    options: FindOptions,
}

impl SearchQuery {
    fn new(model: String, schema: Arc<Schema>, query: Query) -> Self {
        Self {
            model,
            schema,
            query,
            options: FindOptions::default(),
        }
    }

    /// AND another constraint, cast against the model's schema.
    pub fn and(mut self, constraint: Query) -> Result<Self, SearchError> {
        let constraint = cast(&constraint, &self.schema).map_err(|e| {
            warn!(model = %self.model, error = %e, "Chained constraint failed validation");
            metrics::record_cast_failure(&self.model);
            e
        })?;
        self.query = self.query.and(constraint);
        Ok(self)
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: usize) -> Self {
        self.options.skip = skip;
        self
    }

    /// The combined constraint
    #[must_use]
    pub fn conditions(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    /// The combined constraint as a filter document.
    #[must_use]
    pub fn to_filter_document(&self) -> Value {
        DocumentFilter::render(&self.query)
    }

    /// The combined constraint as a parameterised SQL clause over `json_column`.
    #[must_use]
    pub fn to_sql(&self, json_column: &str) -> SqlQuery {
        SqlTranslator::translate_with_schema(&self.query, json_column, &self.schema)
    }

    /// Execute against `store`.
    pub async fn exec<S>(&self, store: &S) -> Result<Vec<Document>, SearchError>
    where
        S: DocumentStore + ?Sized,
    {
        self.run(store, "exec").await
    }

    /// Execute against `store`, delivering the outcome to `callback` exactly once.
    pub async fn exec_with<S, F>(&self, store: &S, callback: F)
    where
        S: DocumentStore + ?Sized,
        F: FnOnce(Result<Vec<Document>, SearchError>),
    {
        callback(self.run(store, "callback").await);
    }

    async fn run<S>(&self, store: &S, mode: &'static str) -> Result<Vec<Document>, SearchError>
    where
        S: DocumentStore + ?Sized,
    {
        let _timer = LatencyTimer::new(&self.model, mode);
        match store.find(&self.query, &self.options).await {
            Ok(documents) => {
                debug!(model = %self.model, mode, results = documents.len(), "Search executed");
                metrics::record_search(&self.model, mode, "success");
                Ok(documents)
            }
            Err(e) => {
                warn!(model = %self.model, mode, error = %e, "Search execution failed");
                metrics::record_search(&self.model, mode, "error");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NumericMatch;
    use crate::schema::FieldDef;
    use crate::search::QueryNode;
    use crate::storage::InMemoryStore;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use metrics_util::CompositeKey;
    use serde_json::json;

    fn person_schema() -> Schema {
        Schema::new()
            .field(FieldDef::string("name").searchable())
            .field(FieldDef::string("address").searchable())
            .field(FieldDef::number("age"))
            .field(FieldDef::boolean("active"))
    }

    fn people() -> SearchableModel {
        SearchableModel::register("person", person_schema(), SearchConfig::default())
    }

    async fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert(Document::new(
                "p1",
                json!({"name": "John", "address": "123 Main Street", "age": 30, "active": true}),
            ))
            .await
            .unwrap();
        store
            .insert(Document::new(
                "p2",
                json!({"name": "Jane", "address": "9 Elm Road", "age": 41, "active": false}),
            ))
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_register_collects_paths_once() {
        let model = people();
        assert_eq!(model.name(), "person");
        assert_eq!(model.searchable_fields(), vec!["name", "address"]);
        assert_eq!(model.searchable_paths().len(), 2);
    }

    #[test]
    fn test_search_builds_filter_and_criteria() {
        let model = people();
        let filter = Query::numeric_eq("age", 30.0);
        let search = model.search("main", Some(&filter)).unwrap();

        let QueryNode::And(parts) = &search.conditions().root else {
            panic!("Expected And node");
        };
        assert_eq!(parts[0], filter.root);
        assert!(matches!(parts[1], QueryNode::Or(_)));
    }

    #[test]
    fn test_blank_term_uses_filter_only() {
        let model = people();
        let filter = Query::numeric_eq("age", 30.0);
        let search = model.search(None::<&str>, Some(&filter)).unwrap();
        assert_eq!(search.conditions(), &filter);

        assert!(model.search("  ", None).unwrap().conditions().is_match_all());
    }

    #[test]
    fn test_filter_is_cast() {
        let model = people();
        let filter = Query::field_eq("age", "30");
        let search = model.search(None::<&str>, Some(&filter)).unwrap();
        assert_eq!(search.conditions(), &Query::numeric_eq("age", 30.0));
    }

    #[test]
    fn test_bad_filter_is_cast_error() {
        let model = people();
        let err = model
            .search("main", Some(&Query::field_eq("age", "thirty")))
            .unwrap_err();
        assert!(err.is_cast());
    }

    #[test]
    fn test_invalid_term_pattern_is_error() {
        let err = people().search("(", None).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern { .. }));
    }

    #[test]
    fn test_search_document_filter() {
        let model = people();
        let search = model.search_document("main", &json!({"age": {"$gte": 18}})).unwrap();
        assert_eq!(search.conditions().leaf_count(), 3);

        assert!(matches!(
            model.search_document("main", &json!({"age": {"$size": 1}})),
            Err(SearchError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_to_filter_document_and_sql() {
        let search = people().search("main", None).unwrap();
        assert_eq!(
            search.to_filter_document(),
            json!({"$or": [
                {"name": {"$regex": "main", "$options": "i"}},
                {"address": {"$regex": "main", "$options": "i"}}
            ]})
        );
        assert_eq!(search.to_sql("data").params.len(), 2);
    }

    #[tokio::test]
    async fn test_search_exec() {
        let store = store().await;
        let model = people();

        let found = model.search_exec("main", None, &store).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p1");

        let none = model.search_exec("999", None, &store).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_with_delivers_once() {
        let store = store().await;
        let model = people();

        let mut calls = 0;
        let mut ids = Vec::new();
        model
            .search_with("j", None, &store, |result| {
                calls += 1;
                ids = result.unwrap().into_iter().map(|d| d.id).collect();
            })
            .await;
        assert_eq!(calls, 1);
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_search_with_delivers_cast_error() {
        let store = store().await;
        let mut outcome = None;
        people()
            .search_with("main", Some(&Query::field_eq("active", "maybe")), &store, |result| {
                outcome = Some(result);
            })
            .await;
        assert!(matches!(outcome, Some(Err(ref e)) if e.is_cast()));
    }

    #[tokio::test]
    async fn test_chain_and_paging() {
        let store = store().await;
        let model = people();

        let search = model
            .search(None::<&str>, None)
            .unwrap()
            .and(Query::bool_eq("active", false))
            .unwrap();
        let found = search.exec(&store).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p2");

        let page = model.search("e", None).unwrap().skip(1).limit(5);
        assert_eq!(page.options().skip, 1);
        assert_eq!(page.exec(&store).await.unwrap().len(), 1);

        assert!(model.search("e", None).unwrap().and(Query::pattern("age", "3", true)).is_err());
    }

    fn counter(snapshot: &[(CompositeKey, DebugValue)], name: &str, labels: &[(&str, &str)]) -> u64 {
        snapshot
            .iter()
            .filter(|(key, _)| key.key().name() == name)
            .filter(|(key, _)| {
                labels
                    .iter()
                    .all(|(k, v)| key.key().labels().any(|l| l.key() == *k && l.value() == *v))
            })
            .map(|(_, value)| match value {
                DebugValue::Counter(n) => *n,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_chained_search_counted_once() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        ::metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let store = store().await;
                let found = people().search("main", None).unwrap().exec(&store).await.unwrap();
                assert_eq!(found.len(), 1);
            });
        });

        let snapshot: Vec<(CompositeKey, DebugValue)> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(key, _, _, value)| (key, value))
            .collect();

        assert_eq!(counter(&snapshot, "schema_search_searches_total", &[]), 1);
        assert_eq!(
            counter(&snapshot, "schema_search_searches_total", &[("mode", "exec"), ("status", "success")]),
            1
        );
        assert_eq!(
            counter(&snapshot, "schema_search_queries_built_total", &[("status", "success")]),
            1
        );
    }

    #[tokio::test]
    async fn test_tolerance_model_matches_numbers() {
        let store = store().await;
        let schema = Schema::new()
            .field(FieldDef::string("name").searchable())
            .field(FieldDef::number("age").searchable());
        let config = SearchConfig {
            numeric_match: NumericMatch::Tolerance,
            ..Default::default()
        };
        let model = SearchableModel::register("person", schema, config);
        assert_eq!(model.searchable_fields(), vec!["name", "age"]);

        let found = model.search_exec("41", None, &store).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p2");
    }
}
