//! Wildcard query implementation for pattern matching.

use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::document::mapper::IndexDocument;
use crate::error::{NewsfindError, Result};
use crate::query::query::{Query, field_values, tokenize};

/// A query that matches documents containing words that match a wildcard
/// pattern.
///
/// Supports the following wildcards:
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    /// The field to search in.
    field: String,
    /// The wildcard pattern.
    pattern: String,
    /// Whether matching ignores case.
    case_insensitive: bool,
    /// The compiled regex for in-process matching.
    regex: Arc<Regex>,
    /// The boost factor for this query.
    boost: f32,
}

impl WildcardQuery {
    /// Create a new case-insensitive wildcard query.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Self::compile_pattern(&pattern, true)?;

        Ok(WildcardQuery {
            field: field.into(),
            pattern,
            case_insensitive: true,
            regex: Arc::new(regex),
            boost: 1.0,
        })
    }

    /// Match words that contain `term` anywhere (`*term*`).
    ///
    /// Wildcard characters inside `term` are dropped so user input can never
    /// widen the pattern.
    pub fn containing<F: Into<String>>(field: F, term: &str) -> Result<Self> {
        let literal: String = term
            .chars()
            .filter(|c| !matches!(c, '*' | '?' | '\\'))
            .collect();
        if literal.is_empty() {
            return Err(NewsfindError::query("empty wildcard term"));
        }
        Self::new(field, format!("*{}*", literal.to_lowercase()))
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compile a wildcard pattern into an anchored regex.
    fn compile_pattern(pattern: &str, case_insensitive: bool) -> Result<Regex> {
        let mut regex_pattern = String::new();
        if case_insensitive {
            regex_pattern.push_str("(?i)");
        }
        regex_pattern.push('^');

        for ch in pattern.chars() {
            match ch {
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                _ => regex_pattern.push_str(&regex::escape(&ch.to_string())),
            }
        }
        regex_pattern.push('$');

        Regex::new(&regex_pattern)
            .map_err(|e| NewsfindError::query(format!("invalid wildcard pattern: {e}")))
    }
}

impl Query for WildcardQuery {
    fn to_dsl(&self) -> Value {
        let mut clause = Map::new();
        clause.insert(
            self.field.clone(),
            json!({
                "value": self.pattern,
                "case_insensitive": self.case_insensitive,
                "boost": self.boost,
            }),
        );
        json!({ "wildcard": clause })
    }

    fn score(&self, doc: &IndexDocument) -> Option<f32> {
        field_values(doc, &self.field)
            .into_iter()
            .flat_map(tokenize)
            .any(|word| self.regex.is_match(&word))
            .then_some(self.boost)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        format!("WildcardQuery({}:{})", self.field, self.pattern)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::article::Article;
    use crate::document::mapper::to_index_document;

    #[test]
    fn test_containing_matches_partial_words() {
        let doc = to_index_document(&Article::new("1", "Semiconductor shortage eases")).unwrap();
        let query = WildcardQuery::containing("title", "CONDUCT").unwrap();
        assert_eq!(query.pattern(), "*conduct*");
        assert_eq!(query.score(&doc), Some(1.0));

        let miss = WildcardQuery::containing("title", "quantum").unwrap();
        assert_eq!(miss.score(&doc), None);
    }

    #[test]
    fn test_user_wildcards_are_stripped() {
        let query = WildcardQuery::containing("title", "a*b?").unwrap();
        assert_eq!(query.pattern(), "*ab*");
        assert!(WildcardQuery::containing("title", "**").is_err());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let doc = to_index_document(&Article::new("1", "c++ tooling")).unwrap();
        // Tokenization drops '+', so the literal pattern "c++" cannot match.
        let query = WildcardQuery::new("title", "c++").unwrap();
        assert_eq!(query.score(&doc), None);
        let query = WildcardQuery::new("title", "too?ing").unwrap();
        assert_eq!(query.score(&doc), Some(1.0));
    }

    #[test]
    fn test_dsl() {
        let dsl = WildcardQuery::containing("title", "gpu")
            .unwrap()
            .with_boost(0.5)
            .to_dsl();
        assert_eq!(dsl["wildcard"]["title"]["value"], "*gpu*");
        assert_eq!(dsl["wildcard"]["title"]["case_insensitive"], true);
    }
}
