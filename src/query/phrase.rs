//! Phrase query implementation for exact phrase matching.

use serde_json::{Value, json};

use crate::document::mapper::IndexDocument;
use crate::query::query::{FieldBoost, Query, field_values, fields_dsl, tokenize};

/// A query that matches documents containing an exact phrase in any of
/// several fields.
///
/// The phrase's terms must appear in order with no other terms between them
/// (unless a slop is set).
#[derive(Debug, Clone)]
pub struct PhraseQuery {
    /// The fields to search in.
    fields: Vec<FieldBoost>,
    /// The phrase text.
    phrase: String,
    /// Maximum allowed distance between terms (0 = exact phrase).
    slop: u32,
    /// The boost factor for this query.
    boost: f32,
}

impl PhraseQuery {
    /// Create a new phrase query over the given fields.
    pub fn new<S: Into<String>>(fields: Vec<FieldBoost>, phrase: S) -> Self {
        PhraseQuery {
            fields,
            phrase: phrase.into(),
            slop: 0,
            boost: 1.0,
        }
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set the slop (maximum distance between terms).
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Get the phrase text.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Get the fields.
    pub fn fields(&self) -> &[FieldBoost] {
        &self.fields
    }
}

impl Query for PhraseQuery {
    fn to_dsl(&self) -> Value {
        json!({
            "multi_match": {
                "query": self.phrase,
                "type": "phrase",
                "fields": fields_dsl(&self.fields),
                "slop": self.slop,
                "boost": self.boost,
            }
        })
    }

    fn score(&self, doc: &IndexDocument) -> Option<f32> {
        let phrase = tokenize(&self.phrase);
        if phrase.is_empty() {
            return None;
        }

        self.fields
            .iter()
            .filter(|field| {
                field_values(doc, &field.name).into_iter().any(|value| {
                    tokenize(value)
                        .windows(phrase.len())
                        .any(|window| window == phrase.as_slice())
                })
            })
            .map(|field| field.weight)
            .reduce(f32::max)
            .map(|weight| weight * self.boost)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        format!("PhraseQuery(\"{}\", slop: {})", self.phrase, self.slop)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
