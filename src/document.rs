//! Stored document.
//!
//! A [`Document`] is the unit a [`DocumentStore`](crate::storage::DocumentStore)
//! holds and a search returns: an id plus a JSON body.
//!
//! # Example
//!
//! ```
//! use schema_search::Document;
//! use serde_json::json;
//!
//! let doc = Document::new(
//!     "person-1",
//!     json!({"name": "Jane", "sisters": [{"name": "Amy"}, {"name": "Zoe"}]})
//! );
//!
//! assert_eq!(doc.id, "person-1");
//! assert_eq!(doc.values_at("sisters.name").len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::search::values_at;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique id within a store
    pub id: String,
    /// The JSON body
    pub content: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, content: Value) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }

    /// Every value reached by a dotted path, fanning out through arrays.
    pub fn values_at(&self, path: &str) -> Vec<&Value> {
        values_at(&self.content, path)
    }

    /// Deserialize the body into a typed value.
    pub fn content_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_document() {
        let doc = Document::new("test-id", json!({"key": "value"}));
        assert_eq!(doc.id, "test-id");
        assert_eq!(doc.content["key"], "value");
    }

    #[test]
    fn test_values_at_nested() {
        let doc = Document::new(
            "p",
            json!({"residence": {"city": {"country": {"name": "Kenya"}}}}),
        );
        assert_eq!(doc.values_at("residence.city.country.name"), vec![&json!("Kenya")]);
        assert!(doc.values_at("residence.street").is_empty());
    }

    #[test]
    fn test_content_as() {
        #[derive(Deserialize)]
        struct Person {
            name: String,
            age: u32,
        }

        let doc = Document::new("p", json!({"name": "Jane", "age": 30}));
        let person: Person = doc.content_as().unwrap();
        assert_eq!(person.name, "Jane");
        assert_eq!(person.age, 30);

        assert!(doc.content_as::<Vec<String>>().is_err());
    }

    #[test]
    fn test_serialize_deserialize() {
        let doc = Document::new("id", json!({"nested": {"key": "value"}, "array": [1, 2, 3]}));
        let json_str = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json_str).unwrap();
        assert_eq!(back, doc);
    }
}
