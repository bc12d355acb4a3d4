// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - AST for document queries
//!
//! Provides a type-safe predicate tree that can be cast against a schema,
//! evaluated in memory, rendered as a filter document or as SQL.
//!
//! # Example
//!
//! ```rust
//! use schema_search::search::{Query, QueryBuilder};
//!
//! // Simple field query
//! let query = Query::field_eq("name", "Alice");
//!
//! // Complex query with builder
//! let query = QueryBuilder::new()
//!     .field_eq("name", "Alice")
//!     .numeric_range("age", Some(25.0), Some(40.0))
//!     .build_and();
//!
//! // Case-insensitive pattern, OR-combined
//! let query = Query::pattern("name", "ali", true)
//!     .or(Query::pattern("email", "ali", true));
//! ```

use serde::{Deserialize, Serialize};

/// Query AST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Root query node
    pub root: QueryNode,
}

impl Default for Query {
    fn default() -> Self {
        Self::match_all()
    }
}

impl Query {
    /// Create a new query from a root node
    pub fn new(root: QueryNode) -> Self {
        Self { root }
    }

    /// The empty constraint: matches every document
    pub fn match_all() -> Self {
        Self::new(QueryNode::MatchAll)
    }

    /// Whether this query imposes no constraint
    pub fn is_match_all(&self) -> bool {
        self.root == QueryNode::MatchAll
    }

    /// The unsatisfiable constraint: an empty OR, matching no document
    pub fn match_none() -> Self {
        Self::new(QueryNode::Or(Vec::new()))
    }

    pub fn is_match_none(&self) -> bool {
        matches!(&self.root, QueryNode::Or(nodes) if nodes.is_empty())
    }

    /// Create a field equals query
    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(field, FieldOperator::Equals, QueryValue::Text(value.into()))
    }

    /// Create a numeric equals query
    pub fn numeric_eq(field: impl Into<String>, value: f64) -> Self {
        Self::leaf(field, FieldOperator::Equals, QueryValue::Numeric(value))
    }

    /// Create a boolean equals query
    pub fn bool_eq(field: impl Into<String>, value: bool) -> Self {
        Self::leaf(field, FieldOperator::Equals, QueryValue::Boolean(value))
    }

    /// Create an inclusive numeric range query: `min <= field <= max`
    pub fn numeric_range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::leaf(
            field,
            FieldOperator::Range,
            QueryValue::NumericRange {
                min: min.map(Bound::inclusive),
                max: max.map(Bound::inclusive),
            },
        )
    }

    /// Create a range query with explicit bounds
    pub fn range(field: impl Into<String>, min: Option<Bound>, max: Option<Bound>) -> Self {
        Self::leaf(field, FieldOperator::Range, QueryValue::NumericRange { min, max })
    }

    /// Create a regular-expression match query.
    ///
    /// The pattern is used verbatim; metacharacters are not escaped.
    pub fn pattern(field: impl Into<String>, pattern: impl Into<String>, case_insensitive: bool) -> Self {
        Self::leaf(
            field,
            FieldOperator::Pattern,
            QueryValue::Pattern {
                pattern: pattern.into(),
                case_insensitive,
            },
        )
    }

    /// Create a membership query: field equals any of `values`
    pub fn one_of(field: impl Into<String>, values: Vec<QueryValue>) -> Self {
        Self::leaf(field, FieldOperator::In, QueryValue::List(values))
    }

    /// Create a presence query
    pub fn exists(field: impl Into<String>, present: bool) -> Self {
        Self::leaf(field, FieldOperator::Exists, QueryValue::Boolean(present))
    }

    fn leaf(field: impl Into<String>, operator: FieldOperator, value: QueryValue) -> Self {
        Self::new(QueryNode::Field(FieldQuery {
            field: field.into(),
            operator,
            value,
        }))
    }

    /// Combine with AND. A match-all side is absorbed.
    pub fn and(self, other: Query) -> Self {
        match (self.is_match_all(), other.is_match_all()) {
            (true, _) => other,
            (false, true) => self,
            (false, false) => Self::new(QueryNode::And(vec![self.root, other.root])),
        }
    }

    /// Combine with OR. A match-all side makes the whole query match-all.
    pub fn or(self, other: Query) -> Self {
        if self.is_match_all() || other.is_match_all() {
            return Self::match_all();
        }
        Self::new(QueryNode::Or(vec![self.root, other.root]))
    }

    /// Negate query
    pub fn negate(self) -> Self {
        Self::new(QueryNode::Not(Box::new(self.root)))
    }

    /// Number of field leaves in the tree
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}

/// Query AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// No constraint
    MatchAll,
    /// Field condition
    Field(FieldQuery),
    /// Boolean AND
    And(Vec<QueryNode>),
    /// Boolean OR
    Or(Vec<QueryNode>),
    /// Boolean NOT
    Not(Box<QueryNode>),
}

impl QueryNode {
    fn leaf_count(&self) -> usize {
        match self {
            QueryNode::MatchAll => 0,
            QueryNode::Field(_) => 1,
            QueryNode::And(nodes) | QueryNode::Or(nodes) => {
                nodes.iter().map(QueryNode::leaf_count).sum()
            }
            QueryNode::Not(inner) => inner.leaf_count(),
        }
    }
}

/// Field query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldQuery {
    /// Dotted field path (e.g., "name", "residence.city.name")
    pub field: String,
    /// Comparison operator
    pub operator: FieldOperator,
    /// Query value
    pub value: QueryValue,
}

/// Field comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOperator {
    /// Exact match
    Equals,
    /// Regular-expression match
    Pattern,
    /// Numeric range
    Range,
    /// Membership in a list of values
    In,
    /// Field presence
    Exists,
}

impl FieldOperator {
    pub fn name(self) -> &'static str {
        match self {
            FieldOperator::Equals => "equals",
            FieldOperator::Pattern => "pattern",
            FieldOperator::Range => "range",
            FieldOperator::In => "in",
            FieldOperator::Exists => "exists",
        }
    }
}

impl std::fmt::Display for FieldOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One end of a numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self { value, inclusive: true }
    }

    pub fn exclusive(value: f64) -> Self {
        Self { value, inclusive: false }
    }
}

/// Query value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    /// Text value
    Text(String),
    /// Numeric value
    Numeric(f64),
    /// Boolean value
    Boolean(bool),
    /// Numeric range
    NumericRange { min: Option<Bound>, max: Option<Bound> },
    /// Scalar values (OR semantics)
    List(Vec<QueryValue>),
    /// Regular expression
    Pattern { pattern: String, case_insensitive: bool },
}

impl std::fmt::Display for QueryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Text(text) => write!(f, "\"{}\"", text),
            QueryValue::Numeric(num) => write!(f, "{}", num),
            QueryValue::Boolean(b) => write!(f, "{}", b),
            QueryValue::NumericRange { min, max } => {
                let lo = min.map(|b| b.value.to_string()).unwrap_or_else(|| "-inf".to_string());
                let hi = max.map(|b| b.value.to_string()).unwrap_or_else(|| "+inf".to_string());
                write!(f, "[{} {}]", lo, hi)
            }
            QueryValue::List(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            QueryValue::Pattern { pattern, case_insensitive } => {
                write!(f, "/{}/{}", pattern, if *case_insensitive { "i" } else { "" })
            }
        }
    }
}

/// Builder for complex queries
#[derive(Default)]
pub struct QueryBuilder {
    nodes: Vec<QueryNode>,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a field equals constraint
    pub fn field_eq(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(Query::field_eq(field, value))
    }

    /// Add a numeric equals constraint
    pub fn numeric_eq(self, field: impl Into<String>, value: f64) -> Self {
        self.push(Query::numeric_eq(field, value))
    }

    /// Add a numeric range constraint
    pub fn numeric_range(self, field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        self.push(Query::numeric_range(field, min, max))
    }

    /// Add a pattern constraint
    pub fn pattern(self, field: impl Into<String>, pattern: impl Into<String>, case_insensitive: bool) -> Self {
        self.push(Query::pattern(field, pattern, case_insensitive))
    }

    /// Add a membership constraint
    pub fn one_of(self, field: impl Into<String>, values: Vec<QueryValue>) -> Self {
        self.push(Query::one_of(field, values))
    }

    /// Add an arbitrary sub-query. Match-all sub-queries are skipped.
    pub fn push(mut self, query: Query) -> Self {
        if !query.is_match_all() {
            self.nodes.push(query.root);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build query with AND semantics (all constraints must match)
    pub fn build_and(self) -> Query {
        self.build_with(QueryNode::And)
    }

    /// Build query with OR semantics (any constraint can match)
    pub fn build_or(self) -> Query {
        self.build_with(QueryNode::Or)
    }

    fn build_with(mut self, combine: fn(Vec<QueryNode>) -> QueryNode) -> Query {
        match self.nodes.len() {
            // Empty query matches everything
            0 => Query::match_all(),
            1 => Query::new(self.nodes.remove(0)),
            _ => Query::new(combine(self.nodes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_field_query() {
        let query = Query::field_eq("name", "Alice");
        assert_eq!(
            query.root,
            QueryNode::Field(FieldQuery {
                field: "name".to_string(),
                operator: FieldOperator::Equals,
                value: QueryValue::Text("Alice".to_string()),
            })
        );
    }

    #[test]
    fn test_and_query() {
        let query = Query::field_eq("name", "Alice")
            .and(Query::numeric_range("age", Some(25.0), Some(40.0)));

        match query.root {
            QueryNode::And(nodes) => assert_eq!(nodes.len(), 2),
            _ => panic!("Expected And node"),
        }
    }

    #[test]
    fn test_and_absorbs_match_all() {
        let query = Query::match_all().and(Query::field_eq("name", "Alice"));
        assert_eq!(query, Query::field_eq("name", "Alice"));

        let query = Query::field_eq("name", "Alice").and(Query::match_all());
        assert_eq!(query, Query::field_eq("name", "Alice"));

        assert!(Query::match_all().and(Query::match_all()).is_match_all());
    }

    #[test]
    fn test_or_with_match_all_is_match_all() {
        let query = Query::field_eq("status", "active").or(Query::match_all());
        assert!(query.is_match_all());
    }

    #[test]
    fn test_or_query() {
        let query = Query::field_eq("status", "active")
            .or(Query::field_eq("status", "pending"));

        match query.root {
            QueryNode::Or(nodes) => assert_eq!(nodes.len(), 2),
            _ => panic!("Expected Or node"),
        }
    }

    #[test]
    fn test_not_query() {
        let query = Query::field_eq("deleted", "true").negate();
        assert!(matches!(query.root, QueryNode::Not(_)));
    }

    #[test]
    fn test_pattern_query() {
        let query = Query::pattern("address", "main", true);
        match query.root {
            QueryNode::Field(FieldQuery { field, operator, value }) => {
                assert_eq!(field, "address");
                assert_eq!(operator, FieldOperator::Pattern);
                assert_eq!(
                    value,
                    QueryValue::Pattern { pattern: "main".to_string(), case_insensitive: true }
                );
            }
            _ => panic!("Expected Field node"),
        }
    }

    #[test]
    fn test_query_builder_and() {
        let query = QueryBuilder::new()
            .field_eq("name", "Alice")
            .numeric_range("age", Some(25.0), Some(40.0))
            .one_of("tags", vec![QueryValue::Text("rust".to_string())])
            .build_and();

        match query.root {
            QueryNode::And(nodes) => assert_eq!(nodes.len(), 3),
            _ => panic!("Expected And node"),
        }
    }

    #[test]
    fn test_query_builder_or() {
        let query = QueryBuilder::new()
            .field_eq("status", "active")
            .field_eq("status", "pending")
            .build_or();

        match query.root {
            QueryNode::Or(nodes) => assert_eq!(nodes.len(), 2),
            _ => panic!("Expected Or node"),
        }
    }

    #[test]
    fn test_builder_single_node_unwrapped() {
        let query = QueryBuilder::new().pattern("name", "al", true).build_or();
        assert_eq!(query, Query::pattern("name", "al", true));
    }

    #[test]
    fn test_builder_skips_match_all() {
        let builder = QueryBuilder::new()
            .push(Query::match_all())
            .field_eq("name", "Alice");
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_empty_builder_is_match_all() {
        assert!(QueryBuilder::new().build_and().is_match_all());
        assert!(QueryBuilder::new().build_or().is_match_all());
    }

    #[test]
    fn test_match_none() {
        let none = Query::match_none();
        assert!(none.is_match_none());
        assert!(!none.is_match_all());
        assert_eq!(none.leaf_count(), 0);
        assert!(!Query::match_all().is_match_none());
        assert!(!Query::field_eq("a", "1").is_match_none());
    }

    #[test]
    fn test_leaf_count() {
        let query = Query::field_eq("a", "1")
            .or(Query::field_eq("b", "2"))
            .and(Query::exists("c", true).negate());
        assert_eq!(query.leaf_count(), 3);
        assert_eq!(Query::match_all().leaf_count(), 0);
    }

    #[test]
    fn test_value_display() {
        let range = QueryValue::NumericRange { min: None, max: Some(Bound::inclusive(40.0)) };
        assert_eq!(range.to_string(), "[-inf 40]");
        let pattern = QueryValue::Pattern { pattern: "ea".into(), case_insensitive: true };
        assert_eq!(pattern.to_string(), "/ea/i");
    }

    #[test]
    fn test_serde_roundtrip_preserves_tree() {
        let query = Query::pattern("name", "jo", true).and(Query::numeric_eq("age", 30.0));
        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
