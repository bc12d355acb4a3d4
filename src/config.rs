// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for searchable models.
//!
//! # Example
//!
//! ```
//! use schema_search::{SearchConfig, MatchMode, NumericMatch};
//!
//! // Canonical policy (uses defaults)
//! let config = SearchConfig::default();
//! assert_eq!(config.numeric_match, NumericMatch::Exclude);
//! assert_eq!(config.match_mode, MatchMode::Substring);
//!
//! // Numeric fields searchable within a tolerance window
//! let config = SearchConfig {
//!     numeric_match: NumericMatch::Tolerance,
//!     numeric_tolerance: 0.5,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// How searchable numeric fields take part in free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericMatch {
    /// Numeric fields are never collected, even when marked searchable.
    #[default]
    Exclude,
    /// Numeric fields are collected and matched with a range of
    /// `term ± numeric_tolerance` when the term parses as a number.
    Tolerance,
}

/// Pattern shape used for textual fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Unanchored match anywhere in the value (`LIKE %term%`).
    #[default]
    Substring,
    /// Match anchored at the end of the value (`LIKE %term`).
    Suffix,
}

/// Configuration applied when a model is registered.
///
/// All fields have defaults matching the canonical policy: textual fields
/// only, case-insensitive substring matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Whether searchable numeric fields are excluded or tolerance-matched
    #[serde(default)]
    pub numeric_match: NumericMatch,

    /// Pattern shape for textual fields
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Half-width of the numeric match window (default: 0.1)
    #[serde(default = "default_numeric_tolerance")]
    pub numeric_tolerance: f64,
}

fn default_numeric_tolerance() -> f64 { 0.1 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            numeric_match: NumericMatch::default(),
            match_mode: MatchMode::default(),
            numeric_tolerance: default_numeric_tolerance(),
        }
    }
}
