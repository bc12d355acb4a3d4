// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for schema-search.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `schema_search_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `model`: registered model name
//! - `mode`: exec, callback
//! - `status`: success, error

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record a model registration and its searchable path count
pub fn record_registration(model: &str, paths: usize) {
    counter!(
        "schema_search_registrations_total",
        "model" => model.to_string()
    )
    .increment(1);
    gauge!(
        "schema_search_searchable_paths",
        "model" => model.to_string()
    )
    .set(paths as f64);
}

/// Record a search invocation
pub fn record_search(model: &str, mode: &str, status: &str) {
    counter!(
        "schema_search_searches_total",
        "model" => model.to_string(),
        "mode" => mode.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a chainable query built without executing it.
///
/// Not a search: the search is counted when the query is executed.
pub fn record_query_built(model: &str, status: &str) {
    counter!(
        "schema_search_queries_built_total",
        "model" => model.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record search execution latency
pub fn record_search_latency(model: &str, mode: &str, duration: Duration) {
    histogram!(
        "schema_search_search_seconds",
        "model" => model.to_string(),
        "mode" => mode.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record how many leaves the compiled criteria holds
pub fn record_criteria_leaves(model: &str, leaves: usize) {
    histogram!(
        "schema_search_criteria_leaves",
        "model" => model.to_string()
    )
    .record(leaves as f64);
}

/// Record a filter or criteria that failed validation
pub fn record_cast_failure(model: &str) {
    counter!(
        "schema_search_cast_failures_total",
        "model" => model.to_string()
    )
    .increment(1);
}

/// Timer guard that records search latency on drop
pub struct LatencyTimer {
    model: String,
    mode: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(model: &str, mode: &'static str) -> Self {
        Self {
            model: model.to_string(),
            mode,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_search_latency(&self.model, self.mode, self.start.elapsed());
    }
}
