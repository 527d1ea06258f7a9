//! Weighted multi-field "best match" query.

use serde_json::{Value, json};

use crate::document::mapper::IndexDocument;
use crate::query::query::{FieldBoost, Query, field_values, fields_dsl, tokenize};

/// Searches the query terms across several weighted fields and scores each
/// document by its best-matching field.
#[derive(Debug, Clone)]
pub struct MultiMatchQuery {
    fields: Vec<FieldBoost>,
    text: String,
    /// Weight given to the other fields' scores (0 = pure best field).
    tie_breaker: f32,
    boost: f32,
}

impl MultiMatchQuery {
    /// Create a new best-fields query.
    pub fn new<S: Into<String>>(fields: Vec<FieldBoost>, text: S) -> Self {
        MultiMatchQuery {
            fields,
            text: text.into(),
            tie_breaker: 0.3,
            boost: 1.0,
        }
    }

    /// Set the tie breaker.
    pub fn with_tie_breaker(mut self, tie_breaker: f32) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the fields.
    pub fn fields(&self) -> &[FieldBoost] {
        &self.fields
    }
}

impl Query for MultiMatchQuery {
    fn to_dsl(&self) -> Value {
        json!({
            "multi_match": {
                "query": self.text,
                "type": "best_fields",
                "fields": fields_dsl(&self.fields),
                "tie_breaker": self.tie_breaker,
                "boost": self.boost,
            }
        })
    }

    fn score(&self, doc: &IndexDocument) -> Option<f32> {
        let terms = tokenize(&self.text);
        if terms.is_empty() {
            return None;
        }

        // Fraction of query terms found in each field, times the field weight.
        let field_scores: Vec<f32> = self
            .fields
            .iter()
            .map(|field| {
                let words: Vec<String> = field_values(doc, &field.name)
                    .into_iter()
                    .flat_map(tokenize)
                    .collect();
                let found = terms.iter().filter(|t| words.contains(t)).count();
                found as f32 / terms.len() as f32 * field.weight
            })
            .collect();

        let best = field_scores.iter().copied().fold(0.0_f32, f32::max);
        if best <= 0.0 {
            return None;
        }
        let rest: f32 = field_scores.iter().sum::<f32>() - best;
        Some((best + self.tie_breaker * rest) * self.boost)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        let fields: Vec<String> = self.fields.iter().map(ToString::to_string).collect();
        format!("MultiMatchQuery(\"{}\" in [{}])", self.text, fields.join(", "))
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
    fn test_best_field_wins() {
        let doc = to_index_document(
            &Article::new("1", "Nvidia earnings beat estimates")
                .with_description("Chipmaker Nvidia posts record revenue"),
        )
        .unwrap();
        let query = MultiMatchQuery::new(
            vec![
                FieldBoost::weighted("title", 3.0),
                FieldBoost::weighted("description", 2.0),
            ],
            "nvidia revenue",
        )
        .with_tie_breaker(0.0);

        // title: 1/2 * 3 = 1.5, description: 2/2 * 2 = 2.0
        assert_eq!(query.score(&doc), Some(2.0));
    }

    #[test]
    fn test_no_terms_found() {
        let doc = to_index_document(&Article::new("1", "Nvidia earnings")).unwrap();
        let query = MultiMatchQuery::new(vec![FieldBoost::new("title")], "tesla");
        assert_eq!(query.score(&doc), None);
    }

    #[test]
    fn test_dsl() {
        let dsl = MultiMatchQuery::new(vec![FieldBoost::weighted("title", 3.0)], "ai")
            .with_boost(5.0)
            .to_dsl();
        assert_eq!(dsl["multi_match"]["type"], "best_fields");
        assert_eq!(dsl["multi_match"]["query"], "ai");
    }
}
