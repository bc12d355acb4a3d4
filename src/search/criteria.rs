// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search criteria compilation.
//!
//! Turns a free-text term and a set of searchable paths into one OR-combined
//! predicate. The term is used as a regular expression as-is: metacharacters
//! such as `.`, `*` or `(` keep their pattern meaning, which lets power users
//! write partial patterns. Callers that need literal matching must escape the
//! term first (e.g. with [`regex::escape`]).

use tracing::debug;

use super::query_builder::{Query, QueryBuilder};
use crate::config::{MatchMode, NumericMatch, SearchConfig};
use crate::schema::{PathKind, SearchablePaths};

/// A free-text search term, possibly absent.
///
/// Numbers are coerced to their textual form so a numeric term can be
/// searched like any other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm(Option<String>);

impl SearchTerm {
    /// The absent term
    pub fn none() -> Self {
        Self(None)
    }

    /// Trimmed term, or `None` when absent or blank.
    pub fn normalized(&self) -> Option<&str> {
        self.0.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.normalized().is_none()
    }
}

impl From<&str> for SearchTerm {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<String> for SearchTerm {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

impl From<&String> for SearchTerm {
    fn from(value: &String) -> Self {
        Self(Some(value.clone()))
    }
}

impl<T: Into<SearchTerm>> From<Option<T>> for SearchTerm {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

macro_rules! term_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SearchTerm {
                fn from(value: $t) -> Self {
                    Self(Some(value.to_string()))
                }
            }
        )*
    };
}

term_from_number!(i32, i64, u32, u64, usize, f32, f64);

/// Compile a search term against `paths`.
///
/// Returns [`Query::match_all`] when the term is blank or no path is
/// searchable. Otherwise every text path gets a case-insensitive pattern
/// leaf and, under [`NumericMatch::Tolerance`], every numeric path gets a
/// `term ± tolerance` range leaf when the term is a finite number. Leaves are
/// OR-combined in path order. A term that yields no leaf at all matches
/// nothing ([`Query::match_none`]).
pub fn compile_search(term: &SearchTerm, paths: &SearchablePaths, config: &SearchConfig) -> Query {
    let Some(term) = term.normalized() else {
        debug!("Blank search term, no criteria");
        return Query::match_all();
    };
    if paths.is_empty() {
        debug!("No searchable paths, no criteria");
        return Query::match_all();
    }

    let pattern = build_pattern(term, config.match_mode);
    let number = parse_number(term);

    let mut builder = QueryBuilder::new();
    for entry in paths.iter() {
        match entry.kind {
            PathKind::Text => {
                builder = builder.pattern(entry.path.as_str(), pattern.as_str(), true);
            }
            PathKind::Numeric if config.numeric_match == NumericMatch::Tolerance => {
                if let Some(n) = number {
                    builder = builder.numeric_range(
                        entry.path.as_str(),
                        Some(n - config.numeric_tolerance),
                        Some(n + config.numeric_tolerance),
                    );
                }
            }
            PathKind::Numeric => {}
        }
    }

    if builder.is_empty() {
        debug!(term = %term, paths = paths.len(), "No path accepts the term, criteria matches nothing");
        return Query::match_none();
    }

    debug!(term = %term, leaves = builder.len(), "Compiled search criteria");
    builder.build_or()
}

/// Pattern for a term under the given match mode. The term is not escaped;
/// suffix mode groups it so every alternative is anchored.
pub fn build_pattern(term: &str, mode: MatchMode) -> String {
    match mode {
        MatchMode::Substring => term.to_string(),
        MatchMode::Suffix => format!("(?:{})$", term),
    }
}

fn parse_number(term: &str) -> Option<f64> {
    term.parse::<f64>().ok().filter(|n| n.is_finite())
}
