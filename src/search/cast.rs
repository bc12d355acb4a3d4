// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Casting predicates against a schema.
//!
//! Every field leaf is checked against the declared type of its path and its
//! value is coerced where the conversion is lossless:
//!
//! | Field type        | Accepted                                        |
//! |-------------------|-------------------------------------------------|
//! | string / [string] | equals, in, pattern, exists                     |
//! | number / [number] | equals, in, range, exists (text parsed as f64)  |
//! | boolean           | equals, in, exists ("true"/"false", 1/0)        |
//! | structures        | exists                                          |
//!
//! Paths the schema does not declare pass through unchanged. Pattern leaves
//! are compiled so an invalid expression fails here, before execution.

use regex::RegexBuilder;
use tracing::{debug, warn};

use super::error::SearchError;
use super::query_builder::{FieldOperator, FieldQuery, Query, QueryNode, QueryValue};
use crate::schema::{FieldType, Schema};

/// Scalar class a leaf value is cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    Text,
    Number,
    Boolean,
}

impl Scalar {
    fn of(field_type: &FieldType) -> Option<Self> {
        match field_type {
            FieldType::String | FieldType::StringArray => Some(Scalar::Text),
            FieldType::Number | FieldType::NumberArray => Some(Scalar::Number),
            FieldType::Boolean => Some(Scalar::Boolean),
            FieldType::Nested(_) | FieldType::Reference(_) | FieldType::NestedArray(_) => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Scalar::Text => "string",
            Scalar::Number => "number",
            Scalar::Boolean => "boolean",
        }
    }
}

/// Cast `query` against `schema`, returning the coerced query.
pub fn cast(query: &Query, schema: &Schema) -> Result<Query, SearchError> {
    let root = cast_node(&query.root, schema).map_err(|e| {
        warn!(error = %e, "Query failed to cast");
        e
    })?;
    Ok(Query::new(root))
}

fn cast_node(node: &QueryNode, schema: &Schema) -> Result<QueryNode, SearchError> {
    match node {
        QueryNode::MatchAll => Ok(QueryNode::MatchAll),
        QueryNode::Field(field) => cast_field(field, schema).map(QueryNode::Field),
        QueryNode::And(nodes) => Ok(QueryNode::And(cast_all(nodes, schema)?)),
        QueryNode::Or(nodes) => Ok(QueryNode::Or(cast_all(nodes, schema)?)),
        QueryNode::Not(inner) => Ok(QueryNode::Not(Box::new(cast_node(inner, schema)?))),
    }
}

fn cast_all(nodes: &[QueryNode], schema: &Schema) -> Result<Vec<QueryNode>, SearchError> {
    nodes.iter().map(|n| cast_node(n, schema)).collect()
}

fn cast_field(field: &FieldQuery, schema: &Schema) -> Result<FieldQuery, SearchError> {
    check_shape(field)?;

    let Some(def) = schema.resolve(&field.field) else {
        debug!(path = %field.field, "Path not declared in schema, passing through");
        if let QueryValue::Pattern { pattern, case_insensitive } = &field.value {
            compile_pattern(&field.field, pattern, *case_insensitive)?;
        }
        return Ok(field.clone());
    };

    if field.operator == FieldOperator::Exists {
        return Ok(field.clone());
    }

    let Some(scalar) = Scalar::of(&def.field_type) else {
        return Err(unsupported(field, &def.field_type));
    };

    let value = match (&field.operator, &field.value) {
        (FieldOperator::Equals, value) => cast_scalar(&field.field, value, scalar)?,
        (FieldOperator::In, QueryValue::List(values)) => QueryValue::List(
            values
                .iter()
                .map(|v| cast_scalar(&field.field, v, scalar))
                .collect::<Result<_, _>>()?,
        ),
        (FieldOperator::Pattern, QueryValue::Pattern { pattern, case_insensitive }) => {
            if scalar != Scalar::Text {
                return Err(unsupported(field, &def.field_type));
            }
            compile_pattern(&field.field, pattern, *case_insensitive)?;
            field.value.clone()
        }
        (FieldOperator::Range, range @ QueryValue::NumericRange { .. }) => {
            if scalar != Scalar::Number {
                return Err(unsupported(field, &def.field_type));
            }
            range.clone()
        }
        _ => return Err(unsupported(field, &def.field_type)),
    };

    Ok(FieldQuery {
        field: field.field.clone(),
        operator: field.operator,
        value,
    })
}

/// Reject operator/value pairs that make no sense regardless of schema.
fn check_shape(field: &FieldQuery) -> Result<(), SearchError> {
    let ok = match (&field.operator, &field.value) {
        (FieldOperator::Equals, QueryValue::Text(_) | QueryValue::Numeric(_) | QueryValue::Boolean(_)) => true,
        (FieldOperator::Pattern, QueryValue::Pattern { .. }) => true,
        (FieldOperator::Range, QueryValue::NumericRange { .. }) => true,
        (FieldOperator::In, QueryValue::List(values)) => values
            .iter()
            .all(|v| matches!(v, QueryValue::Text(_) | QueryValue::Numeric(_) | QueryValue::Boolean(_))),
        (FieldOperator::Exists, QueryValue::Boolean(_)) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(SearchError::InvalidFilter(format!(
            "operator {} does not accept value {} at path '{}'",
            field.operator, field.value, field.field
        )))
    }
}

fn cast_scalar(path: &str, value: &QueryValue, scalar: Scalar) -> Result<QueryValue, SearchError> {
    let failed = || SearchError::Cast {
        path: path.to_string(),
        expected: scalar.name(),
        value: value.to_string(),
    };

    match (scalar, value) {
        (Scalar::Text, QueryValue::Text(_)) => Ok(value.clone()),
        (Scalar::Text, QueryValue::Numeric(n)) => Ok(QueryValue::Text(n.to_string())),
        (Scalar::Text, QueryValue::Boolean(b)) => Ok(QueryValue::Text(b.to_string())),

        (Scalar::Number, QueryValue::Numeric(_)) => Ok(value.clone()),
        (Scalar::Number, QueryValue::Text(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(QueryValue::Numeric)
            .ok_or_else(failed),

        (Scalar::Boolean, QueryValue::Boolean(_)) => Ok(value.clone()),
        (Scalar::Boolean, QueryValue::Text(text)) => match text.trim() {
            "true" => Ok(QueryValue::Boolean(true)),
            "false" => Ok(QueryValue::Boolean(false)),
            _ => Err(failed()),
        },
        (Scalar::Boolean, QueryValue::Numeric(n)) if *n == 1.0 => Ok(QueryValue::Boolean(true)),
        (Scalar::Boolean, QueryValue::Numeric(n)) if *n == 0.0 => Ok(QueryValue::Boolean(false)),

        _ => Err(failed()),
    }
}

fn compile_pattern(path: &str, pattern: &str, case_insensitive: bool) -> Result<regex::Regex, SearchError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| SearchError::InvalidPattern {
            path: path.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

fn unsupported(field: &FieldQuery, field_type: &FieldType) -> SearchError {
    SearchError::UnsupportedOperator {
        path: field.field.clone(),
        operator: field.operator.name(),
        field_type: field_type.name(),
    }
}
