//! Boolean query implementation for combining multiple queries.

use serde_json::{Map, Value, json};

use crate::document::mapper::IndexDocument;
use crate::query::query::Query;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match and contributes to the score.
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must match but does not affect the score.
    Filter,
}

impl Occur {
    fn dsl_key(self) -> &'static str {
        match self {
            Occur::Must => "must",
            Occur::Should => "should",
            Occur::Filter => "filter",
        }
    }
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The query for this clause.
    pub query: Box<dyn Query>,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl BooleanClause {
    /// Create a new boolean clause.
    pub fn new(query: Box<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }
}

/// A boolean query that combines multiple queries with boolean logic.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    /// The clauses in this boolean query.
    clauses: Vec<BooleanClause>,
    /// The boost factor for this query.
    boost: f32,
    /// Minimum number of should clauses that must match, if set explicitly.
    minimum_should_match: Option<usize>,
}

impl BooleanQuery {
    /// Create a new empty boolean query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            boost: 1.0,
            minimum_should_match: None,
        }
    }

    /// Add a clause to this boolean query.
    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    /// Add a MUST clause.
    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::new(query, Occur::Must));
    }

    /// Add a SHOULD clause.
    pub fn add_should(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::new(query, Occur::Should));
    }

    /// Add a FILTER clause.
    pub fn add_filter(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::new(query, Occur::Filter));
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set the minimum number of should clauses that must match.
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = Some(minimum);
        self
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    /// Check if this boolean query is empty.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Should clauses required to match: explicit value, else 1 when there
    /// are only should clauses, else 0.
    fn effective_minimum_should_match(&self) -> usize {
        self.minimum_should_match.unwrap_or_else(|| {
            let has_required = self
                .clauses
                .iter()
                .any(|c| matches!(c.occur, Occur::Must | Occur::Filter));
            let has_should = self.clauses.iter().any(|c| c.occur == Occur::Should);
            usize::from(has_should && !has_required)
        })
    }
}

impl Default for BooleanQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for BooleanQuery {
    fn to_dsl(&self) -> Value {
        let mut body = Map::new();
        for occur in [Occur::Must, Occur::Should, Occur::Filter] {
            let clauses: Vec<Value> = self
                .clauses
                .iter()
                .filter(|c| c.occur == occur)
                .map(|c| c.query.to_dsl())
                .collect();
            if !clauses.is_empty() {
                body.insert(occur.dsl_key().to_string(), Value::Array(clauses));
            }
        }
        if let Some(minimum) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(minimum));
        }
        body.insert("boost".to_string(), json!(self.boost));
        json!({ "bool": body })
    }

    fn score(&self, doc: &IndexDocument) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let mut total = 0.0;
        let mut should_matches = 0;

        for clause in &self.clauses {
            let score = clause.query.score(doc);
            match (clause.occur, score) {
                (Occur::Must, Some(s)) => total += s,
                (Occur::Must | Occur::Filter, None) => return None,
                (Occur::Should, Some(s)) => {
                    total += s;
                    should_matches += 1;
                }
                _ => {}
            }
        }

        (should_matches >= self.effective_minimum_should_match()).then_some(total * self.boost)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|c| format!("{}:{}", c.occur.dsl_key(), c.query.description()))
            .collect();
        format!("BooleanQuery({})", parts.join(", "))
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
    use crate::query::term::TermQuery;

    fn doc() -> IndexDocument {
        to_index_document(
            &Article::new("1", "t")
                .with_category("business")
                .with_tags(["ai", "chips"]),
        )
        .unwrap()
    }

    #[test]
    fn test_should_only_requires_one_match() {
        let mut query = BooleanQuery::new();
        query.add_should(Box::new(TermQuery::new("tags", "ai").with_boost(2.0)));
        query.add_should(Box::new(TermQuery::new("tags", "crypto")));
        assert_eq!(query.score(&doc()), Some(2.0));

        let mut none = BooleanQuery::new();
        none.add_should(Box::new(TermQuery::new("tags", "crypto")));
        assert_eq!(none.score(&doc()), None);
    }

    #[test]
    fn test_filter_is_hard_and_unscored() {
        let mut query = BooleanQuery::new().with_minimum_should_match(1);
        query.add_should(Box::new(TermQuery::new("tags", "ai")));
        query.add_filter(Box::new(TermQuery::new("category", "BUSINESS").with_boost(100.0)));
        assert_eq!(query.score(&doc()), Some(1.0));

        let mut filtered_out = query.clone();
        filtered_out.add_filter(Box::new(TermQuery::new("category", "sports")));
        assert_eq!(filtered_out.score(&doc()), None);
    }

    #[test]
    fn test_must_adds_score() {
        let mut query = BooleanQuery::new();
        query.add_must(Box::new(TermQuery::new("tags", "ai")));
        query.add_should(Box::new(TermQuery::new("tags", "chips").with_boost(0.5)));
        assert_eq!(query.score(&doc()), Some(1.5));

        query.add_must(Box::new(TermQuery::new("tags", "crypto")));
        assert_eq!(query.score(&doc()), None);
    }

    #[test]
    fn test_dsl_layout() {
        let mut query = BooleanQuery::new().with_minimum_should_match(1);
        query.add_should(Box::new(TermQuery::new("tags", "ai")));
        query.add_filter(Box::new(TermQuery::new("category", "business")));
        let dsl = query.to_dsl();
        assert_eq!(dsl["bool"]["should"].as_array().unwrap().len(), 1);
        assert_eq!(dsl["bool"]["filter"][0]["term"]["category"]["value"], "business");
        assert_eq!(dsl["bool"]["minimum_should_match"], 1);
        assert!(dsl["bool"].get("must").is_none());
    }
}
