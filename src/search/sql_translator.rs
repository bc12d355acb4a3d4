// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL Translator
//!
//! Translates Query AST to SQL WHERE clauses for JSON column queries.
//! Uses MySQL 8 JSON functions.
//!
//! # SQL Syntax Generated
//!
//! ```sql
//! JSON_UNQUOTE(JSON_EXTRACT(data, '$.field')) = ?                 -- Exact match
//! REGEXP_LIKE(JSON_UNQUOTE(JSON_EXTRACT(data, '$.field')), ?, 'i') -- Pattern
//! JSON_EXTRACT(data, '$.age') >= ? AND JSON_EXTRACT(...) <= ?     -- Range
//! JSON_CONTAINS_PATH(data, 'one', '$.field')                      -- Presence
//! EXISTS (SELECT 1 FROM JSON_TABLE(data, '$.items[*].name' ...))  -- Array fan-out
//! ```
//!
//! Paths that cross an array are only known with a schema; use
//! [`SqlTranslator::translate_with_schema`] so such leaves fan out over every
//! element through `JSON_TABLE`.

use super::query_builder::{Bound, FieldOperator, FieldQuery, Query, QueryNode, QueryValue};
use crate::schema::Schema;

/// SQL query translator for JSON column queries
pub struct SqlTranslator;

/// SQL query result with parameterized placeholders
#[derive(Debug, Clone)]
pub struct SqlQuery {
    /// The WHERE clause (without "WHERE" keyword)
    pub clause: String,
    /// The parameter values in order
    pub params: Vec<SqlParam>,
}

/// SQL parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Numeric(f64),
    Boolean(bool),
}

/// Where a leaf's values live: a single JSON path, or the rows of a
/// wildcard path.
enum Target {
    Scalar(String),
    Rows(String),
}

impl SqlTranslator {
    /// Translate Query AST to parameterized SQL WHERE clause
    ///
    /// Uses `?` placeholders for parameters (MySQL style)
    pub fn translate(query: &Query, json_column: &str) -> SqlQuery {
        let mut params = Vec::new();
        let clause = Self::translate_node(&query.root, json_column, None, &mut params);
        SqlQuery { clause, params }
    }

    /// Like [`translate`](Self::translate), expanding array segments of each
    /// path to `[*]` according to `schema`.
    pub fn translate_with_schema(query: &Query, json_column: &str, schema: &Schema) -> SqlQuery {
        let mut params = Vec::new();
        let clause = Self::translate_node(&query.root, json_column, Some(schema), &mut params);
        SqlQuery { clause, params }
    }

    /// Translate Query AST to SQL WHERE clause with inline values
    ///
    /// Warning: Only use for debugging, not for actual queries (SQL injection risk)
    pub fn translate_inline(query: &Query, json_column: &str) -> String {
        let sql = Self::translate(query, json_column);

        let mut result = sql.clause;
        for param in sql.params {
            let value = match param {
                SqlParam::Text(s) => format!("'{}'", s.replace('\'', "''")),
                SqlParam::Numeric(n) => n.to_string(),
                SqlParam::Boolean(b) => if b { "TRUE" } else { "FALSE" }.to_string(),
            };
            result = result.replacen('?', &value, 1);
        }
        result
    }

    fn translate_node(
        node: &QueryNode,
        json_col: &str,
        schema: Option<&Schema>,
        params: &mut Vec<SqlParam>,
    ) -> String {
        match node {
            QueryNode::MatchAll => "1=1".to_string(),
            QueryNode::Field(field_query) => Self::translate_field(field_query, json_col, schema, params),
            QueryNode::And(nodes) => Self::join(nodes, " AND ", "1=1", json_col, schema, params),
            QueryNode::Or(nodes) => Self::join(nodes, " OR ", "1=0", json_col, schema, params),
            QueryNode::Not(inner) => {
                format!("NOT ({})", Self::translate_node(inner, json_col, schema, params))
            }
        }
    }

    fn join(
        nodes: &[QueryNode],
        separator: &str,
        empty: &str,
        json_col: &str,
        schema: Option<&Schema>,
        params: &mut Vec<SqlParam>,
    ) -> String {
        let parts: Vec<String> = nodes
            .iter()
            .map(|n| Self::translate_node(n, json_col, schema, params))
            .collect();
        match parts.len() {
            0 => empty.to_string(),
            1 => parts[0].clone(),
            _ => format!("({})", parts.join(separator)),
        }
    }

    fn translate_field(
        field: &FieldQuery,
        json_col: &str,
        schema: Option<&Schema>,
        params: &mut Vec<SqlParam>,
    ) -> String {
        let json_path = Self::json_path(&field.field, schema);

        if field.operator == FieldOperator::Exists {
            let present = matches!(field.value, QueryValue::Boolean(true));
            let check = format!("JSON_CONTAINS_PATH({}, 'one', '{}')", json_col, json_path);
            return if present { check } else { format!("NOT {}", check) };
        }

        let target = if json_path.contains("[*]") {
            Target::Rows(json_path)
        } else {
            Target::Scalar(json_path)
        };

        let (text, raw) = match &target {
            Target::Scalar(path) => (
                format!("JSON_UNQUOTE(JSON_EXTRACT({}, '{}'))", json_col, path),
                format!("JSON_EXTRACT({}, '{}')", json_col, path),
            ),
            Target::Rows(_) => ("JSON_UNQUOTE(jt.v)".to_string(), "jt.v".to_string()),
        };

        let condition = match (&field.operator, &field.value) {
            (FieldOperator::Equals, value) => Self::equals(&text, &raw, value, params),
            (FieldOperator::Pattern, QueryValue::Pattern { pattern, case_insensitive }) => {
                params.push(SqlParam::Text(pattern.clone()));
                let flags = if *case_insensitive { "i" } else { "c" };
                format!("REGEXP_LIKE({}, ?, '{}')", text, flags)
            }
            (FieldOperator::Range, QueryValue::NumericRange { min, max }) => {
                Self::range(&raw, min, max, params)
            }
            (FieldOperator::In, QueryValue::List(values)) => {
                let conditions: Vec<String> = values
                    .iter()
                    .map(|value| Self::equals(&text, &raw, value, params))
                    .collect();
                match conditions.len() {
                    0 => "1=0".to_string(),
                    1 => conditions[0].clone(),
                    _ => format!("({})", conditions.join(" OR ")),
                }
            }
            // Malformed leaf
            _ => "1=0".to_string(),
        };

        match target {
            Target::Scalar(_) => condition,
            Target::Rows(path) => format!(
                "EXISTS (SELECT 1 FROM JSON_TABLE({}, '{}' COLUMNS (v JSON PATH '$')) AS jt WHERE {})",
                json_col, path, condition
            ),
        }
    }

    fn equals(text: &str, raw: &str, value: &QueryValue, params: &mut Vec<SqlParam>) -> String {
        match value {
            QueryValue::Text(s) => {
                params.push(SqlParam::Text(s.clone()));
                format!("{} = ?", text)
            }
            QueryValue::Numeric(n) => {
                params.push(SqlParam::Numeric(*n));
                format!("{} = ?", raw)
            }
            QueryValue::Boolean(b) => {
                params.push(SqlParam::Boolean(*b));
                format!("{} = ?", raw)
            }
            _ => "1=0".to_string(),
        }
    }

    fn range(raw: &str, min: &Option<Bound>, max: &Option<Bound>, params: &mut Vec<SqlParam>) -> String {
        match (min, max) {
            (Some(lo), Some(hi)) if lo.inclusive && hi.inclusive => {
                params.push(SqlParam::Numeric(lo.value));
                params.push(SqlParam::Numeric(hi.value));
                format!("{} BETWEEN ? AND ?", raw)
            }
            (None, None) => "1=1".to_string(),
            _ => {
                let mut parts = Vec::new();
                if let Some(lo) = min {
                    params.push(SqlParam::Numeric(lo.value));
                    parts.push(format!("{} {} ?", raw, if lo.inclusive { ">=" } else { ">" }));
                }
                if let Some(hi) = max {
                    params.push(SqlParam::Numeric(hi.value));
                    parts.push(format!("{} {} ?", raw, if hi.inclusive { "<=" } else { "<" }));
                }
                parts.join(" AND ")
            }
        }
    }

    fn json_path(field: &str, schema: Option<&Schema>) -> String {
        // "user.name" -> "$.user.name"
        if field.starts_with('$') {
            return field.to_string();
        }
        let Some(schema) = schema else {
            return format!("$.{}", field);
        };

        let flags = schema.array_segments(field);
        let mut path = String::from("$");
        for (segment, is_array) in field.split('.').zip(flags) {
            path.push('.');
            path.push_str(segment);
            if is_array {
                path.push_str("[*]");
            }
        }
        path
    }
}
