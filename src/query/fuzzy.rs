//! Fuzzy query implementation for approximate string matching.

use serde_json::{Value, json};

use crate::document::mapper::IndexDocument;
use crate::query::query::{FieldBoost, Query, field_values, fields_dsl, tokenize};
use crate::spelling::levenshtein::{damerau_distance, edit_distance_within};

/// A multi-field fuzzy query for approximate term matching.
///
/// This is what tolerates genuine typos on the backend side: each query term
/// matches any indexed word within the allowed number of edits.
#[derive(Debug, Clone)]
pub struct FuzzyQuery {
    /// Fields to search in
    fields: Vec<FieldBoost>,
    /// Text whose terms are matched fuzzily
    text: String,
    /// Maximum edits a term may be away from an indexed word
    fuzziness: u8,
    /// Minimum prefix length that must match exactly
    prefix_length: u32,
    /// Whether transpositions count as single edits (Damerau-Levenshtein)
    transpositions: bool,
    /// Maximum number of terms each query term expands to
    max_expansions: usize,
    /// Boost factor for the query
    boost: f32,
}

impl FuzzyQuery {
    /// Create a new fuzzy query with default settings.
    pub fn new<S: Into<String>>(fields: Vec<FieldBoost>, text: S) -> Self {
        FuzzyQuery {
            fields,
            text: text.into(),
            fuzziness: 2,
            prefix_length: 0,
            transpositions: true,
            max_expansions: 50,
            boost: 1.0,
        }
    }

    /// Set the maximum number of edits per term.
    pub fn fuzziness(mut self, max_edits: u8) -> Self {
        self.fuzziness = max_edits;
        self
    }

    /// Set the minimum prefix length that must match exactly.
    pub fn prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    /// Set whether transpositions should be considered single edits.
    pub fn transpositions(mut self, transpositions: bool) -> Self {
        self.transpositions = transpositions;
        self
    }

    /// Set the maximum number of terms to expand to.
    pub fn max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the prefix length.
    pub fn get_prefix_length(&self) -> u32 {
        self.prefix_length
    }

    /// Get the maximum number of terms to expand to.
    pub fn get_max_expansions(&self) -> usize {
        self.max_expansions
    }

    /// Whether `word` is within reach of `term`.
    fn term_matches(&self, term: &str, word: &str) -> bool {
        let prefix = self.prefix_length as usize;
        if prefix > 0 && !term.chars().take(prefix).eq(word.chars().take(prefix)) {
            return false;
        }

        let term_len = term.chars().count();
        // Never let a term match by rewriting every one of its characters.
        let max = usize::from(self.fuzziness).min(term_len.saturating_sub(1));

        if self.transpositions {
            word.chars().count().abs_diff(term_len) <= max && damerau_distance(term, word) <= max
        } else {
            edit_distance_within(term, word, max).is_some()
        }
    }
}

impl Query for FuzzyQuery {
    fn to_dsl(&self) -> Value {
        json!({
            "multi_match": {
                "query": self.text,
                "fields": fields_dsl(&self.fields),
                "fuzziness": self.fuzziness,
                "prefix_length": self.prefix_length,
                "max_expansions": self.max_expansions,
                "fuzzy_transpositions": self.transpositions,
                "boost": self.boost,
            }
        })
    }

    fn score(&self, doc: &IndexDocument) -> Option<f32> {
        let terms = tokenize(&self.text);
        if terms.is_empty() {
            return None;
        }

        let mut best = 0.0_f32;
        for field in &self.fields {
            let words: Vec<String> = field_values(doc, &field.name)
                .into_iter()
                .flat_map(tokenize)
                .collect();
            let matched = terms
                .iter()
                .filter(|term| {
                    words.iter().any(|word| self.term_matches(term, word))
                })
                .count();
            best = best.max(matched as f32 / terms.len() as f32 * field.weight);
        }

        (best > 0.0).then_some(best * self.boost)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        format!(
            "FuzzyQuery(\"{}\", fuzziness: {}, prefix: {})",
            self.text, self.fuzziness, self.prefix_length
        )
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
