// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use thiserror::Error;

use crate::storage::StoreError;

/// Errors surfaced by search construction and execution.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A value could not be cast to the declared type of its field.
    #[error("Cast to {expected} failed for value {value} at path '{path}'")]
    Cast {
        path: String,
        expected: &'static str,
        value: String,
    },
    /// The operator cannot be applied to the field's declared type.
    #[error("Operator {operator} is not supported on {field_type} field '{path}'")]
    UnsupportedOperator {
        path: String,
        operator: &'static str,
        field_type: &'static str,
    },
    /// A pattern leaf holds an invalid regular expression.
    #[error("Invalid pattern '{pattern}' at path '{path}': {source}")]
    InvalidPattern {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// A filter document could not be parsed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Unknown model '{0}'")]
    UnknownModel(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SearchError {
    /// Whether this error came from validating a predicate against the schema.
    pub fn is_cast(&self) -> bool {
        matches!(
            self,
            SearchError::Cast { .. }
                | SearchError::UnsupportedOperator { .. }
                | SearchError::InvalidPattern { .. }
        )
    }
}
