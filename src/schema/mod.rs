// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Data-model descriptions.
//!
//! A [`Schema`] is an ordered list of [`FieldDef`]s. Each field carries a
//! closed [`FieldType`] tag and an optional searchable marker. Sub-structures
//! are either declared inline ([`FieldType::Nested`]) or shared between
//! parents through an `Arc` ([`FieldType::Reference`],
//! [`FieldType::NestedArray`]).
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use schema_search::schema::{FieldDef, Schema};
//!
//! let relative = Arc::new(Schema::new().field(FieldDef::string("name").searchable()));
//!
//! let person = Schema::new()
//!     .field(FieldDef::number("age"))
//!     .field(FieldDef::string("address").searchable())
//!     .field(FieldDef::reference("brother", relative.clone()))
//!     .field(FieldDef::nested_array("sisters", relative));
//!
//! let mut paths = Vec::new();
//! person.each_path(|path, _| paths.push(path.to_string()));
//! assert_eq!(paths, ["age", "address", "brother", "brother.name", "sisters", "sisters.name"]);
//! ```

mod collector;

pub use collector::{collect_searchable_paths, PathKind, SearchablePath, SearchablePaths};

use std::sync::Arc;

use tracing::warn;

/// Type classification of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Scalar text
    String,
    /// Scalar number
    Number,
    /// Scalar boolean
    Boolean,
    /// Array of text values
    StringArray,
    /// Array of numbers
    NumberArray,
    /// Inline sub-structure owned by this field
    Nested(Schema),
    /// Single sub-structure shared by reference
    Reference(Arc<Schema>),
    /// Array of sub-structures
    NestedArray(Arc<Schema>),
}

impl FieldType {
    /// Textual scalar or array of text.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::StringArray)
    }

    /// Numeric scalar or array of numbers.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::NumberArray)
    }

    /// Any array type, leaf or structured.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            FieldType::StringArray | FieldType::NumberArray | FieldType::NestedArray(_)
        )
    }

    /// Child structure, if this field has one.
    #[must_use]
    pub fn children(&self) -> Option<&Schema> {
        match self {
            FieldType::Nested(schema) => Some(schema),
            FieldType::Reference(schema) | FieldType::NestedArray(schema) => Some(schema.as_ref()),
            _ => None,
        }
    }

    /// Short name used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::StringArray => "string array",
            FieldType::NumberArray => "number array",
            FieldType::Nested(_) => "nested structure",
            FieldType::Reference(_) => "referenced structure",
            FieldType::NestedArray(_) => "structure array",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Local field name (a single path segment)
    pub name: String,
    /// Type classification
    pub field_type: FieldType,
    /// Opt-in marker for free-text search
    pub searchable: bool,
}

impl FieldDef {
    /// Create a field of the given type, not searchable.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            searchable: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn string_array(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::StringArray)
    }

    pub fn number_array(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::NumberArray)
    }

    pub fn nested(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, FieldType::Nested(schema))
    }

    pub fn reference(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self::new(name, FieldType::Reference(schema))
    }

    pub fn nested_array(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self::new(name, FieldType::NestedArray(schema))
    }

    /// Mark the field searchable.
    #[must_use]
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }
}

/// Ordered set of field definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field. A field with an existing name replaces the earlier one in place.
    ///
    /// A field with an empty name has no path and is dropped.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        if field.name.is_empty() {
            warn!(field_type = %field.field_type, "Dropping field with an empty name");
            return self;
        }
        if let Some(pos) = self.fields.iter().position(|f| f.name == field.name) {
            self.fields[pos] = field;
        } else {
            self.fields.push(field);
        }
        self
    }

    /// Top-level fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Visit every field depth-first, pre-order, in declaration order.
    ///
    /// The visitor receives the dotted path and the field definition. Container
    /// fields are visited before their children; array elements share the
    /// array's own path prefix.
    pub fn each_path<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &FieldDef),
    {
        self.walk("", &mut visit);
    }

    fn walk<F>(&self, prefix: &str, visit: &mut F)
    where
        F: FnMut(&str, &FieldDef),
    {
        for field in &self.fields {
            let path = join_path(prefix, &field.name);
            visit(&path, field);
            if let Some(children) = field.field_type.children() {
                children.walk(&path, visit);
            }
        }
    }

    /// Resolve a dotted path to its field definition.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&FieldDef> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.iter().find(|f| f.name == first)?;
        for segment in segments {
            let children = current.field_type.children()?;
            current = children.fields.iter().find(|f| f.name == segment)?;
        }
        Some(current)
    }

    /// Whether any segment of `path` resolves to an array field.
    ///
    /// Returns one flag per segment; unknown segments are reported as `false`
    /// and stop the walk.
    #[must_use]
    pub fn array_segments(&self, path: &str) -> Vec<bool> {
        let mut flags = Vec::new();
        let mut scope = Some(self);
        for segment in path.split('.') {
            let field = scope.and_then(|s| s.fields.iter().find(|f| f.name == segment));
            match field {
                Some(field) => {
                    flags.push(field.field_type.is_array());
                    scope = field.field_type.children();
                }
                None => {
                    flags.push(false);
                    scope = None;
                }
            }
        }
        flags
    }
}

/// Join a prefix and a local name with `.`, omitting an empty prefix.
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relative() -> Arc<Schema> {
        Arc::new(Schema::new().field(FieldDef::string("name").searchable()))
    }

    #[test]
    fn test_join_path_omits_empty_prefix() {
        assert_eq!(join_path("", "name"), "name");
        assert_eq!(join_path("residence.city", "name"), "residence.city.name");
    }

    #[test]
    fn test_each_path_pre_order() {
        let schema = Schema::new()
            .field(FieldDef::nested(
                "name",
                Schema::new()
                    .field(FieldDef::string("firstName"))
                    .field(FieldDef::string("surname")),
            ))
            .field(FieldDef::string("address"));

        let mut paths = Vec::new();
        schema.each_path(|path, _| paths.push(path.to_string()));
        assert_eq!(paths, ["name", "name.firstName", "name.surname", "address"]);
    }

    #[test]
    fn test_shared_reference_visited_per_occurrence() {
        let rel = relative();
        let schema = Schema::new()
            .field(FieldDef::reference("brother", rel.clone()))
            .field(FieldDef::reference("aunt", rel.clone()))
            .field(FieldDef::nested_array("friends", rel));

        let mut paths = Vec::new();
        schema.each_path(|path, field| {
            if field.field_type == FieldType::String {
                paths.push(path.to_string());
            }
        });
        assert_eq!(paths, ["brother.name", "aunt.name", "friends.name"]);
    }

    #[test]
    fn test_field_replaces_same_name() {
        let schema = Schema::new()
            .field(FieldDef::string("title"))
            .field(FieldDef::number("age"))
            .field(FieldDef::string("title").searchable());

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields()[0].name, "title");
        assert!(schema.fields()[0].searchable);
    }

    #[test]
    fn test_empty_name_dropped() {
        let schema = Schema::new()
            .field(FieldDef::string("").searchable())
            .field(FieldDef::nested("a", Schema::new().field(FieldDef::string("").searchable())));

        assert_eq!(schema.len(), 1);
        let mut paths = Vec::new();
        schema.each_path(|path, _| paths.push(path.to_string()));
        assert_eq!(paths, ["a"]);
    }

    #[test]
    fn test_resolve_through_structures() {
        let country = Schema::new().field(FieldDef::string("name").searchable());
        let city = Schema::new()
            .field(FieldDef::string("name"))
            .field(FieldDef::nested("country", country));
        let schema = Schema::new()
            .field(FieldDef::reference("residence", Arc::new(
                Schema::new().field(FieldDef::nested("city", city)),
            )))
            .field(FieldDef::nested_array("sisters", relative()));

        let country_name = schema.resolve("residence.city.country.name").unwrap();
        assert_eq!(country_name.field_type, FieldType::String);
        assert!(country_name.searchable);

        assert!(schema.resolve("sisters.name").is_some());
        assert!(schema.resolve("sisters.age").is_none());
        assert!(schema.resolve("residence.city.name.first").is_none());
        assert!(schema.resolve("").is_none());
    }

    #[test]
    fn test_array_segments() {
        let schema = Schema::new()
            .field(FieldDef::nested_array("sisters", relative()))
            .field(FieldDef::string_array("titles"))
            .field(FieldDef::string("address"));

        assert_eq!(schema.array_segments("sisters.name"), vec![true, false]);
        assert_eq!(schema.array_segments("titles"), vec![true]);
        assert_eq!(schema.array_segments("address"), vec![false]);
        assert_eq!(schema.array_segments("missing.deep"), vec![false, false]);
    }

    #[test]
    fn test_type_predicates() {
        assert!(FieldType::String.is_textual());
        assert!(FieldType::StringArray.is_textual());
        assert!(!FieldType::Number.is_textual());
        assert!(FieldType::NumberArray.is_numeric());
        assert!(!FieldType::Boolean.is_numeric());
        assert!(FieldType::NestedArray(relative()).is_array());
        assert!(FieldType::Nested(Schema::new()).children().is_some());
    }
}
