// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Searchable path collection.
//!
//! Walks a schema once and produces the ordered, duplicate-free list of
//! dotted paths that opted into free-text search.

use std::collections::HashSet;

use tracing::debug;

use super::{FieldDef, Schema};
use crate::config::NumericMatch;

/// How a collected path is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Text or array of text, matched with a pattern
    Text,
    /// Number or array of numbers, matched with a tolerance window
    Numeric,
}

/// A single collected path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchablePath {
    pub path: String,
    pub kind: PathKind,
}

/// Ordered set of searchable dotted paths.
///
/// Immutable once collected; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchablePaths {
    entries: Vec<SearchablePath>,
}

impl SearchablePaths {
    /// Build from raw entries, dropping repeated paths (first occurrence wins).
    pub fn from_entries(entries: impl IntoIterator<Item = SearchablePath>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.path.clone()))
            .collect();
        Self { entries }
    }

    /// All dotted paths in collection order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchablePath> {
        self.entries.iter()
    }

    /// Paths matched with a text pattern.
    pub fn text_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == PathKind::Text)
            .map(|e| e.path.as_str())
    }

    /// Paths matched with a numeric window.
    pub fn numeric_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == PathKind::Numeric)
            .map(|e| e.path.as_str())
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collect every searchable path of `schema`.
///
/// A field is collected when it carries the searchable marker and is textual
/// (string or array of strings). Under [`NumericMatch::Tolerance`] searchable
/// numeric fields are collected too, tagged [`PathKind::Numeric`].
/// Sub-structures, shared or inline, are walked under their own path prefix.
pub fn collect_searchable_paths(schema: &Schema, numeric: NumericMatch) -> SearchablePaths {
    let mut entries = Vec::new();

    schema.each_path(|path, field| {
        if let Some(kind) = classify(field, numeric) {
            entries.push(SearchablePath {
                path: path.to_string(),
                kind,
            });
        }
    });

    let paths = SearchablePaths::from_entries(entries);
    debug!(count = paths.len(), ?numeric, "Collected searchable paths");
    paths
}

fn classify(field: &FieldDef, numeric: NumericMatch) -> Option<PathKind> {
    if !field.searchable {
        return None;
    }
    if field.field_type.is_textual() {
        return Some(PathKind::Text);
    }
    if numeric == NumericMatch::Tolerance && field.field_type.is_numeric() {
        return Some(PathKind::Numeric);
    }
    None
}
