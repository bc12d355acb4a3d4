// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory evaluation of queries against JSON documents.
//!
//! Dotted paths fan out through arrays: `sisters.name` reaches the `name` of
//! every element of `sisters`, and a leaf matches when any reached value
//! matches. A path that ends on an array of scalars reaches each element.
//! Presence is checked on the path itself, so a field holding `[]` exists.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::error::SearchError;
use super::query_builder::{Bound, FieldOperator, FieldQuery, Query, QueryNode, QueryValue};

/// A query with its patterns compiled, ready to test many documents.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    root: Node,
}

#[derive(Debug, Clone)]
enum Node {
    All,
    Leaf { path: Vec<String>, test: Leaf },
    And(Vec<Node>),
    Or(Vec<Node>),
    Not(Box<Node>),
}

#[derive(Debug, Clone)]
enum Leaf {
    Equals(QueryValue),
    Pattern(Regex),
    Range { min: Option<Bound>, max: Option<Bound> },
    In(Vec<QueryValue>),
    Exists(bool),
    Never,
}

impl CompiledQuery {
    /// Compile every pattern in `query`.
    pub fn compile(query: &Query) -> Result<Self, SearchError> {
        Ok(Self { root: compile_node(&query.root)? })
    }

    /// Whether `document` satisfies the query.
    pub fn matches(&self, document: &Value) -> bool {
        eval(&self.root, document)
    }
}

/// Compile and evaluate in one step.
pub fn matches(document: &Value, query: &Query) -> Result<bool, SearchError> {
    Ok(CompiledQuery::compile(query)?.matches(document))
}

/// Every value reached by a dotted path, fanning out through arrays.
pub fn values_at<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    resolve(document, &segments, &mut out);
    out
}

fn resolve<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        match value {
            Value::Array(items) => out.extend(items.iter()),
            other => out.push(other),
        }
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*head) {
                resolve(child, rest, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                resolve(item, segments, out);
            }
        }
        _ => {}
    }
}

/// Whether the path leads to a value in some branch, `null` and `[]` included.
fn present(value: &Value, segments: &[String]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return true;
    };
    match value {
        Value::Object(map) => map.get(head).is_some_and(|child| present(child, rest)),
        Value::Array(items) => items.iter().any(|item| present(item, segments)),
        _ => false,
    }
}

fn compile_node(node: &QueryNode) -> Result<Node, SearchError> {
    Ok(match node {
        QueryNode::MatchAll => Node::All,
        QueryNode::Field(field) => Node::Leaf {
            path: field.field.split('.').map(str::to_string).collect(),
            test: compile_leaf(field)?,
        },
        QueryNode::And(nodes) => Node::And(nodes.iter().map(compile_node).collect::<Result<_, _>>()?),
        QueryNode::Or(nodes) => Node::Or(nodes.iter().map(compile_node).collect::<Result<_, _>>()?),
        QueryNode::Not(inner) => Node::Not(Box::new(compile_node(inner)?)),
    })
}

fn compile_leaf(field: &FieldQuery) -> Result<Leaf, SearchError> {
    Ok(match (&field.operator, &field.value) {
        (FieldOperator::Equals, value) => Leaf::Equals(value.clone()),
        (FieldOperator::Pattern, QueryValue::Pattern { pattern, case_insensitive }) => {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(*case_insensitive)
                .build()
                .map_err(|source| SearchError::InvalidPattern {
                    path: field.field.clone(),
                    pattern: pattern.clone(),
                    source,
                })?;
            Leaf::Pattern(regex)
        }
        (FieldOperator::Range, QueryValue::NumericRange { min, max }) => Leaf::Range { min: *min, max: *max },
        (FieldOperator::In, QueryValue::List(values)) => Leaf::In(values.clone()),
        (FieldOperator::Exists, QueryValue::Boolean(present)) => Leaf::Exists(*present),
        // Malformed leaves never match
        _ => Leaf::Never,
    })
}

fn eval(node: &Node, document: &Value) -> bool {
    match node {
        Node::All => true,
        Node::Leaf { path, test: Leaf::Exists(expected) } => present(document, path) == *expected,
        Node::Leaf { path, test } => {
            let segments: Vec<&str> = path.iter().map(String::as_str).collect();
            let mut values = Vec::new();
            resolve(document, &segments, &mut values);
            eval_leaf(test, &values)
        }
        Node::And(nodes) => nodes.iter().all(|n| eval(n, document)),
        Node::Or(nodes) => nodes.iter().any(|n| eval(n, document)),
        Node::Not(inner) => !eval(inner, document),
    }
}

fn eval_leaf(test: &Leaf, values: &[&Value]) -> bool {
    match test {
        Leaf::Equals(expected) => values.iter().any(|v| scalar_eq(v, expected)),
        Leaf::Pattern(regex) => values
            .iter()
            .any(|v| v.as_str().is_some_and(|s| regex.is_match(s))),
        Leaf::Range { min, max } => values
            .iter()
            .filter_map(|v| v.as_f64())
            .any(|n| within(n, min, max)),
        Leaf::In(options) => values
            .iter()
            .any(|v| options.iter().any(|o| scalar_eq(v, o))),
        Leaf::Exists(expected) => values.is_empty() != *expected,
        Leaf::Never => false,
    }
}

fn scalar_eq(value: &Value, expected: &QueryValue) -> bool {
    match (value, expected) {
        (Value::String(s), QueryValue::Text(t)) => s == t,
        (Value::Number(n), QueryValue::Numeric(e)) => n.as_f64() == Some(*e),
        (Value::Bool(b), QueryValue::Boolean(e)) => b == e,
        _ => false,
    }
}

fn within(n: f64, min: &Option<Bound>, max: &Option<Bound>) -> bool {
    let above = match min {
        Some(b) if b.inclusive => n >= b.value,
        Some(b) => n > b.value,
        None => true,
    };
    let below = match max {
        Some(b) if b.inclusive => n <= b.value,
        Some(b) => n < b.value,
        None => true,
    };
    above && below
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Value {
        json!({
            "age": 30,
            "active": true,
            "address": "123 Main Street",
            "titles": ["Engineer", "Manager"],
            "scores": [21, 44],
            "sisters": [{"name": "Amy"}, {"name": "Zoe"}],
            "residence": {"city": {"country": {"name": "Kenya"}}}
        })
    }

    #[test]
    fn test_values_at_fans_out() {
        let doc = person();
        assert_eq!(values_at(&doc, "sisters.name"), vec![&json!("Amy"), &json!("Zoe")]);
        assert_eq!(values_at(&doc, "titles").len(), 2);
        assert_eq!(values_at(&doc, "residence.city.country.name"), vec![&json!("Kenya")]);
        assert!(values_at(&doc, "residence.street").is_empty());
    }

    #[test]
    fn test_pattern_case_insensitive_substring() {
        let doc = person();
        assert!(matches(&doc, &Query::pattern("address", "main", true)).unwrap());
        assert!(matches(&doc, &Query::pattern("address", "MAIN", true)).unwrap());
        assert!(!matches(&doc, &Query::pattern("address", "main", false)).unwrap());
        assert!(!matches(&doc, &Query::pattern("address", "999", true)).unwrap());
    }

    #[test]
    fn test_pattern_never_matches_numbers() {
        assert!(!matches(&person(), &Query::pattern("age", "30", true)).unwrap());
    }

    #[test]
    fn test_array_leaf_any_element() {
        let doc = person();
        assert!(matches(&doc, &Query::pattern("titles", "manag", true)).unwrap());
        assert!(matches(&doc, &Query::pattern("sisters.name", "zo", true)).unwrap());
        assert!(matches(&doc, &Query::numeric_range("scores", Some(40.0), None)).unwrap());
    }

    #[test]
    fn test_equals_and_in() {
        let doc = person();
        assert!(matches(&doc, &Query::numeric_eq("age", 30.0)).unwrap());
        assert!(matches(&doc, &Query::bool_eq("active", true)).unwrap());
        assert!(!matches(&doc, &Query::field_eq("age", "30")).unwrap());
        assert!(matches(
            &doc,
            &Query::one_of("sisters.name", vec![QueryValue::Text("Zoe".into())])
        )
        .unwrap());
    }

    #[test]
    fn test_range_bounds() {
        let doc = person();
        assert!(matches(&doc, &Query::numeric_range("age", Some(29.9), Some(30.1))).unwrap());
        assert!(!matches(&doc, &Query::range("age", Some(Bound::exclusive(30.0)), None)).unwrap());
        assert!(matches(&doc, &Query::range("age", Some(Bound::inclusive(30.0)), None)).unwrap());
    }

    #[test]
    fn test_exists() {
        let doc = person();
        assert!(matches(&doc, &Query::exists("residence.city", true)).unwrap());
        assert!(matches(&doc, &Query::exists("nickname", false)).unwrap());
        assert!(!matches(&doc, &Query::exists("nickname", true)).unwrap());
        assert!(matches(&doc, &Query::exists("sisters.name", true)).unwrap());
    }

    #[test]
    fn test_exists_on_empty_array_and_null() {
        let doc = json!({"tags": [], "sisters": [], "note": null});
        assert!(matches(&doc, &Query::exists("tags", true)).unwrap());
        assert!(!matches(&doc, &Query::exists("tags", false)).unwrap());
        assert!(matches(&doc, &Query::exists("note", true)).unwrap());
        // No element to carry the sub-field
        assert!(!matches(&doc, &Query::exists("sisters.name", true)).unwrap());
        assert!(matches(&doc, &Query::exists("sisters.name", false)).unwrap());

        let filter = crate::search::DocumentFilter::parse(&json!({"tags": {"$exists": false}})).unwrap();
        assert!(!matches(&doc, &filter).unwrap());
    }

    #[test]
    fn test_boolean_connectives() {
        let doc = person();
        let hit = Query::pattern("address", "main", true);
        let miss = Query::pattern("address", "elm", true);

        assert!(matches(&doc, &hit.clone().or(miss.clone())).unwrap());
        assert!(!matches(&doc, &hit.clone().and(miss.clone())).unwrap());
        assert!(matches(&doc, &miss.negate()).unwrap());
        assert!(matches(&doc, &Query::match_all()).unwrap());
        assert!(!matches(&doc, &Query::new(QueryNode::Or(vec![]))).unwrap());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(matches(&person(), &Query::pattern("address", "(", true)).is_err());
    }
}
