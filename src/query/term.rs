//! Term query implementation for exact keyword matching.

use serde_json::{Map, Value, json};

use crate::document::mapper::IndexDocument;
use crate::query::query::{Query, field_values};

/// A query that matches documents whose keyword field equals a value.
///
/// Like a keyword lookup, the value is not analyzed. Matching ignores case.
#[derive(Debug, Clone)]
pub struct TermQuery {
    /// The field to search in.
    field: String,
    /// The exact value to look for.
    value: String,
    /// The boost factor for this query.
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F, T>(field: F, value: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            value: value.into(),
            boost: 1.0,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for TermQuery {
    fn to_dsl(&self) -> Value {
        let mut clause = Map::new();
        clause.insert(
            self.field.clone(),
            json!({
                "value": self.value,
                "case_insensitive": true,
                "boost": self.boost,
            }),
        );
        json!({ "term": clause })
    }

    fn score(&self, doc: &IndexDocument) -> Option<f32> {
        field_values(doc, &self.field)
            .into_iter()
            .any(|v| v.to_lowercase() == self.value.to_lowercase())
            .then_some(self.boost)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        format!("TermQuery({}:{})", self.field, self.value)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
