// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Document Filter Translator
//!
//! Translates between the Query AST and JSON filter documents in the
//! operator dialect common to document stores.
//!
//! # Filter Syntax
//!
//! ```text
//! {"name": "Alice"}                               - Equals (implicit)
//! {"age": {"$eq": 30}}                            - Equals
//! {"age": {"$gte": 25, "$lt": 40}}                - Numeric range
//! {"tags": {"$in": ["rust", "database"]}}         - Membership (OR)
//! {"name": {"$regex": "ali", "$options": "i"}}    - Pattern
//! {"deleted": {"$exists": false}}                 - Presence
//! {"name": {"$ne": "Bob"}}                        - Not equals
//! {"$and": [f1, f2]}  {"$or": [f1, f2]}           - Boolean AND / OR
//! {"$nor": [f1]}                                  - Boolean NOT
//! {"a": 1, "b": 2}                                - Implicit AND
//! ```

use serde_json::{json, Map, Number, Value};

use super::error::SearchError;
use super::query_builder::{Bound, FieldOperator, FieldQuery, Query, QueryNode, QueryValue};

/// Filter document translator
pub struct DocumentFilter;

impl DocumentFilter {
    /// Render a query as a filter document. Match-all renders as `{}`.
    pub fn render(query: &Query) -> Value {
        Self::render_node(&query.root)
    }

    /// Parse a filter document into a query. `{}` parses as match-all.
    pub fn parse(filter: &Value) -> Result<Query, SearchError> {
        Ok(Query::new(Self::parse_object(filter)?))
    }

    fn render_node(node: &QueryNode) -> Value {
        match node {
            QueryNode::MatchAll => json!({}),
            QueryNode::Field(field) => Self::render_field(field),
            QueryNode::And(nodes) => json!({ "$and": nodes.iter().map(Self::render_node).collect::<Vec<_>>() }),
            // Stores reject an empty $or
            QueryNode::Or(nodes) if nodes.is_empty() => json!({ "$nor": [{}] }),
            QueryNode::Or(nodes) => json!({ "$or": nodes.iter().map(Self::render_node).collect::<Vec<_>>() }),
            QueryNode::Not(inner) => json!({ "$nor": [Self::render_node(inner)] }),
        }
    }

    fn render_field(field: &FieldQuery) -> Value {
        let condition = match (&field.operator, &field.value) {
            (FieldOperator::Equals, value) => Self::render_scalar(value),
            (FieldOperator::Pattern, QueryValue::Pattern { pattern, case_insensitive }) => {
                if *case_insensitive {
                    json!({ "$regex": pattern, "$options": "i" })
                } else {
                    json!({ "$regex": pattern })
                }
            }
            (FieldOperator::Range, QueryValue::NumericRange { min, max }) => {
                let mut ops = Map::new();
                if let Some(b) = min {
                    let op = if b.inclusive { "$gte" } else { "$gt" };
                    ops.insert(op.to_string(), Self::number(b.value));
                }
                if let Some(b) = max {
                    let op = if b.inclusive { "$lte" } else { "$lt" };
                    ops.insert(op.to_string(), Self::number(b.value));
                }
                Value::Object(ops)
            }
            (FieldOperator::In, QueryValue::List(values)) => {
                json!({ "$in": values.iter().map(Self::render_scalar).collect::<Vec<_>>() })
            }
            (FieldOperator::Exists, QueryValue::Boolean(present)) => json!({ "$exists": present }),
            (operator, value) => {
                let mut ops = Map::new();
                ops.insert(format!("${}", operator), Self::render_scalar(value));
                Value::Object(ops)
            }
        };

        let mut doc = Map::new();
        doc.insert(field.field.clone(), condition);
        Value::Object(doc)
    }

    fn render_scalar(value: &QueryValue) -> Value {
        match value {
            QueryValue::Text(text) => Value::String(text.clone()),
            QueryValue::Numeric(num) => Self::number(*num),
            QueryValue::Boolean(b) => Value::Bool(*b),
            QueryValue::List(values) => Value::Array(values.iter().map(Self::render_scalar).collect()),
            other => Value::String(other.to_string()),
        }
    }

    /// Integral values render as integers so `30.0` reads back as `30`.
    fn number(value: f64) -> Value {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Value::Number(Number::from(value as i64))
        } else {
            Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
        }
    }

    fn parse_object(filter: &Value) -> Result<QueryNode, SearchError> {
        let Value::Object(map) = filter else {
            return Err(invalid(format!("filter must be an object, got {}", filter)));
        };

        let mut nodes = Vec::with_capacity(map.len());
        for (key, value) in map {
            match key.as_str() {
                "$and" => nodes.push(QueryNode::And(Self::parse_list(key, value)?)),
                "$or" => nodes.push(QueryNode::Or(Self::parse_list(key, value)?)),
                "$nor" => {
                    let mut inner = Self::parse_list(key, value)?;
                    let negated = if inner.len() == 1 { inner.remove(0) } else { QueryNode::Or(inner) };
                    nodes.push(QueryNode::Not(Box::new(negated)));
                }
                op if op.starts_with('$') => {
                    return Err(invalid(format!("unsupported top-level operator '{}'", op)));
                }
                field => nodes.extend(Self::parse_field(field, value)?),
            }
        }

        Ok(match nodes.len() {
            0 => QueryNode::MatchAll,
            1 => nodes.remove(0),
            _ => QueryNode::And(nodes),
        })
    }

    fn parse_list(op: &str, value: &Value) -> Result<Vec<QueryNode>, SearchError> {
        let Value::Array(items) = value else {
            return Err(invalid(format!("'{}' expects an array", op)));
        };
        if items.is_empty() {
            return Err(invalid(format!("'{}' expects a non-empty array", op)));
        }
        items.iter().map(Self::parse_object).collect()
    }

    fn parse_field(field: &str, condition: &Value) -> Result<Vec<QueryNode>, SearchError> {
        let ops = match condition {
            Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => ops,
            Value::Object(_) | Value::Array(_) | Value::Null => {
                return Err(invalid(format!(
                    "unsupported condition {} for field '{}'",
                    condition, field
                )));
            }
            scalar => return Ok(vec![leaf(field, FieldOperator::Equals, Self::parse_scalar(field, scalar)?)]),
        };

        let mut nodes = Vec::new();
        let mut min: Option<Bound> = None;
        let mut max: Option<Bound> = None;

        for (op, operand) in ops {
            match op.as_str() {
                "$eq" => nodes.push(leaf(field, FieldOperator::Equals, Self::parse_scalar(field, operand)?)),
                "$ne" => nodes.push(QueryNode::Not(Box::new(leaf(
                    field,
                    FieldOperator::Equals,
                    Self::parse_scalar(field, operand)?,
                )))),
                "$gt" => min = Some(Bound::exclusive(Self::parse_number(field, op, operand)?)),
                "$gte" => min = Some(Bound::inclusive(Self::parse_number(field, op, operand)?)),
                "$lt" => max = Some(Bound::exclusive(Self::parse_number(field, op, operand)?)),
                "$lte" => max = Some(Bound::inclusive(Self::parse_number(field, op, operand)?)),
                "$in" => {
                    let Value::Array(items) = operand else {
                        return Err(invalid(format!("'$in' on '{}' expects an array", field)));
                    };
                    let values = items
                        .iter()
                        .map(|item| Self::parse_scalar(field, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    nodes.push(leaf(field, FieldOperator::In, QueryValue::List(values)));
                }
                "$exists" => {
                    let present = match operand {
                        Value::Bool(b) => *b,
                        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                        _ => return Err(invalid(format!("'$exists' on '{}' expects a boolean", field))),
                    };
                    nodes.push(leaf(field, FieldOperator::Exists, QueryValue::Boolean(present)));
                }
                "$regex" => {
                    let Value::String(pattern) = operand else {
                        return Err(invalid(format!("'$regex' on '{}' expects a string", field)));
                    };
                    let options = match ops.get("$options") {
                        Some(Value::String(options)) => options.as_str(),
                        Some(other) => {
                            return Err(invalid(format!("'$options' on '{}' expects a string, got {}", field, other)));
                        }
                        None => "",
                    };
                    let (pattern, case_insensitive) = Self::apply_options(field, pattern, options)?;
                    nodes.push(leaf(
                        field,
                        FieldOperator::Pattern,
                        QueryValue::Pattern { pattern, case_insensitive },
                    ));
                }
                "$options" => {
                    if !ops.contains_key("$regex") {
                        return Err(invalid(format!("'$options' on '{}' without '$regex'", field)));
                    }
                }
                other => {
                    return Err(invalid(format!("unsupported operator '{}' on field '{}'", other, field)));
                }
            }
        }

        if min.is_some() || max.is_some() {
            nodes.push(leaf(field, FieldOperator::Range, QueryValue::NumericRange { min, max }));
        }
        Ok(nodes)
    }

    /// Fold `$options` flags into the pattern. `i` maps to case-insensitivity;
    /// `m`, `s` and `x` become inline flags.
    fn apply_options(field: &str, pattern: &str, options: &str) -> Result<(String, bool), SearchError> {
        let mut case_insensitive = false;
        let mut inline = String::new();
        for flag in options.chars() {
            match flag {
                'i' => case_insensitive = true,
                'm' | 's' | 'x' => inline.push(flag),
                other => {
                    return Err(invalid(format!("unsupported regex option '{}' on '{}'", other, field)));
                }
            }
        }
        let pattern = if inline.is_empty() {
            pattern.to_string()
        } else {
            format!("(?{}){}", inline, pattern)
        };
        Ok((pattern, case_insensitive))
    }

    fn parse_scalar(field: &str, value: &Value) -> Result<QueryValue, SearchError> {
        match value {
            Value::String(s) => Ok(QueryValue::Text(s.clone())),
            Value::Bool(b) => Ok(QueryValue::Boolean(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(QueryValue::Numeric)
                .ok_or_else(|| invalid(format!("number {} on '{}' is out of range", n, field))),
            other => Err(invalid(format!("expected a scalar for '{}', got {}", field, other))),
        }
    }

    fn parse_number(field: &str, op: &str, value: &Value) -> Result<f64, SearchError> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
        .ok_or_else(|| invalid(format!("'{}' on '{}' expects a number, got {}", op, field, value)))
    }
}

fn leaf(field: &str, operator: FieldOperator, value: QueryValue) -> QueryNode {
    QueryNode::Field(FieldQuery {
        field: field.to_string(),
        operator,
        value,
    })
}

fn invalid(message: String) -> SearchError {
    SearchError::InvalidFilter(message)
}
