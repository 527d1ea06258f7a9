//! Builds the structured, multi-strategy query sent to the search backend.
//!
//! A planned query is a disjunction of four retrieval strategies, from most
//! to least precise:
//!
//! 1. exact phrase across title, description, content and tags,
//! 2. weighted best-fields match,
//! 3. fuzzy expansion (up to two edits per term, no required prefix),
//! 4. `*term*` wildcards for partial words.
//!
//! Each strategy carries its own boost so the backend's relevance scorer
//! favours precision over recall. The category, when given, is a hard filter
//! rather than a scored clause. Results sort by relevance first and recency
//! second.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::document::article::category_filter;
use crate::error::{NewsfindError, Result};
use crate::query::boolean::BooleanQuery;
use crate::query::fuzzy::FuzzyQuery;
use crate::query::multi_match::MultiMatchQuery;
use crate::query::phrase::PhraseQuery;
use crate::query::query::{FieldBoost, Query, tokenize};
use crate::query::suggester::{
    CompletionSuggester, PhraseSuggester, SuggestRequest, TermSuggester,
};
use crate::query::term::TermQuery;
use crate::query::wildcard::WildcardQuery;

/// Weights and field lists used when planning queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Boost of the exact phrase strategy.
    pub phrase_boost: f32,
    /// Boost of the best-fields strategy.
    pub best_fields_boost: f32,
    /// Boost of the fuzzy strategy.
    pub fuzzy_boost: f32,
    /// Boost of the wildcard strategy.
    pub wildcard_boost: f32,
    /// Fields searched by the exact phrase strategy.
    pub phrase_fields: Vec<FieldBoost>,
    /// Fields and weights of the best-fields strategy.
    pub best_fields: Vec<FieldBoost>,
    /// Fields searched by the fuzzy strategy.
    pub fuzzy_fields: Vec<FieldBoost>,
    /// Fields searched by the wildcard strategy.
    pub wildcard_fields: Vec<String>,
    /// Maximum edits per term for the fuzzy strategy.
    pub fuzzy_max_edits: u8,
    /// Characters that must match exactly before fuzzy edits apply.
    pub fuzzy_prefix_length: u32,
    /// Terms each fuzzy query term may expand to.
    pub fuzzy_max_expansions: usize,
    /// Query tokens shorter than this never become wildcard clauses.
    pub wildcard_min_chars: usize,
    /// At most this many tokens become wildcard clauses.
    pub wildcard_max_terms: usize,
    /// Fields returned with highlight markup.
    pub highlight_fields: Vec<String>,
    /// Completions requested from the completion suggester.
    pub completion_size: usize,
    /// Keyword field holding the category.
    pub category_field: String,
    /// Date field used as the recency tie-break.
    pub published_field: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            phrase_boost: 10.0,
            best_fields_boost: 5.0,
            fuzzy_boost: 2.0,
            wildcard_boost: 1.0,
            phrase_fields: vec![
                FieldBoost::weighted("title", 2.0),
                FieldBoost::new("description"),
                FieldBoost::new("content"),
                FieldBoost::new("tags"),
            ],
            best_fields: vec![
                FieldBoost::weighted("title", 3.0),
                FieldBoost::weighted("tags", 2.0),
                FieldBoost::weighted("description", 2.0),
                FieldBoost::new("content"),
            ],
            fuzzy_fields: vec![
                FieldBoost::weighted("title", 2.0),
                FieldBoost::new("description"),
                FieldBoost::new("tags"),
            ],
            wildcard_fields: vec!["title".to_string(), "description".to_string()],
            fuzzy_max_edits: 2,
            fuzzy_prefix_length: 0,
            fuzzy_max_expansions: 100,
            wildcard_min_chars: 2,
            wildcard_max_terms: 5,
            highlight_fields: vec!["title".to_string(), "description".to_string()],
            completion_size: 5,
            category_field: "category".to_string(),
            published_field: "publishedAt".to_string(),
        }
    }
}

/// Per-request planning options.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// Category filter; `None` or `"all"` means no filter.
    pub category: Option<String>,
    /// Maximum hits to return.
    pub size: usize,
    /// Offset of the first hit.
    pub from: usize,
    /// Whether to attach the suggesters.
    pub spell_check: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            category: None,
            size: 10,
            from: 0,
            spell_check: true,
        }
    }
}

impl QueryOptions {
    /// Set the category filter.
    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the result size.
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the result offset.
    pub fn from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    /// Enable or disable the suggesters.
    pub fn spell_check(mut self, spell_check: bool) -> Self {
        self.spell_check = spell_check;
        self
    }

    /// The category filter, with the `"all"` sentinel removed.
    pub fn category_filter(&self) -> Option<&str> {
        category_filter(self.category.as_deref())
    }
}

/// One key of the sort order.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Relevance score, descending.
    Score,
    /// A document field, descending; documents without it sort last.
    FieldDesc(String),
}

impl SortKey {
    fn to_dsl(&self) -> Value {
        match self {
            SortKey::Score => json!({ "_score": { "order": "desc" } }),
            SortKey::FieldDesc(field) => {
                let mut key = Map::new();
                key.insert(
                    field.clone(),
                    json!({ "order": "desc", "missing": "_last", "unmapped_type": "date" }),
                );
                Value::Object(key)
            }
        }
    }
}

/// A fully planned search request.
#[derive(Debug, Clone)]
pub struct StructuredQuery {
    /// The query text the plan was built for.
    pub text: String,
    /// Scored retrieval clauses plus the category filter.
    pub query: BooleanQuery,
    /// The category filter, already folded into `query`.
    pub category: Option<String>,
    pub from: usize,
    pub size: usize,
    pub sort: Vec<SortKey>,
    /// Fields to return highlighted.
    pub highlight_fields: Vec<String>,
    /// Suggesters, when spell checking is enabled.
    pub suggest: Option<SuggestRequest>,
}

impl StructuredQuery {
    /// Render the complete search body.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_dsl());
        body.insert("from".to_string(), json!(self.from));
        body.insert("size".to_string(), json!(self.size));
        body.insert(
            "sort".to_string(),
            Value::Array(self.sort.iter().map(SortKey::to_dsl).collect()),
        );

        if !self.highlight_fields.is_empty() {
            let fields: Map<String, Value> = self
                .highlight_fields
                .iter()
                .map(|f| (f.clone(), json!({ "number_of_fragments": 0 })))
                .collect();
            body.insert(
                "highlight".to_string(),
                json!({
                    "pre_tags": [HIGHLIGHT_PRE_TAG],
                    "post_tags": [HIGHLIGHT_POST_TAG],
                    "fields": fields,
                }),
            );
        }

        if let Some(suggest) = self.suggest.as_ref().filter(|s| !s.is_empty()) {
            body.insert("suggest".to_string(), suggest.to_dsl());
        }

        Value::Object(body)
    }
}

/// Markup opening a highlighted span.
pub const HIGHLIGHT_PRE_TAG: &str = "<mark>";
/// Markup closing a highlighted span.
pub const HIGHLIGHT_POST_TAG: &str = "</mark>";

/// Turns query text into [`StructuredQuery`] plans.
///
/// Holds only an immutable configuration, so one planner can be shared by
/// every concurrent search.
#[derive(Debug, Clone, Default)]
pub struct QueryPlanner {
    config: Arc<PlannerConfig>,
}

impl QueryPlanner {
    /// Create a planner with the given configuration.
    pub fn new(config: Arc<PlannerConfig>) -> Self {
        QueryPlanner { config }
    }

    /// Get the planner configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan the full four-strategy query.
    pub fn build_query(&self, text: &str, options: &QueryOptions) -> Result<StructuredQuery> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NewsfindError::query("cannot plan an empty query"));
        }
        let config = &self.config;

        let mut query = BooleanQuery::new().with_minimum_should_match(1);
        query.add_should(Box::new(
            PhraseQuery::new(config.phrase_fields.clone(), text).with_boost(config.phrase_boost),
        ));
        query.add_should(Box::new(
            MultiMatchQuery::new(config.best_fields.clone(), text)
                .with_boost(config.best_fields_boost),
        ));
        query.add_should(Box::new(
            FuzzyQuery::new(config.fuzzy_fields.clone(), text)
                .fuzziness(config.fuzzy_max_edits)
                .prefix_length(config.fuzzy_prefix_length)
                .max_expansions(config.fuzzy_max_expansions)
                .with_boost(config.fuzzy_boost),
        ));
        if let Some(wildcards) = self.wildcard_clause(text) {
            query.add_should(Box::new(wildcards));
        }

        let category = options.category_filter().map(str::to_string);
        if let Some(category) = &category {
            query.add_filter(Box::new(TermQuery::new(
                config.category_field.clone(),
                category.clone(),
            )));
        }

        let suggest = options.spell_check.then(|| {
            SuggestRequest::new(text)
                .with_term(TermSuggester::new("title"))
                .with_phrase(PhraseSuggester::new("title.trigram", "title"))
                .with_completion(CompletionSuggester {
                    size: config.completion_size,
                    ..CompletionSuggester::new("suggest")
                })
        });

        Ok(StructuredQuery {
            text: text.to_string(),
            query,
            category,
            from: options.from,
            size: options.size,
            sort: self.sort_order(),
            highlight_fields: config.highlight_fields.clone(),
            suggest,
        })
    }

    /// Plan the plain keyword query used by the secondary tier: a single
    /// best-fields match over title and description, same filter and sort,
    /// no suggesters or highlighting.
    pub fn build_simple_query(
        &self,
        text: &str,
        options: &QueryOptions,
    ) -> Result<StructuredQuery> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NewsfindError::query("cannot plan an empty query"));
        }

        let mut query = BooleanQuery::new();
        query.add_must(Box::new(MultiMatchQuery::new(
            vec![FieldBoost::new("title"), FieldBoost::new("description")],
            text,
        )));

        let category = options.category_filter().map(str::to_string);
        if let Some(category) = &category {
            query.add_filter(Box::new(TermQuery::new(
                self.config.category_field.clone(),
                category.clone(),
            )));
        }

        Ok(StructuredQuery {
            text: text.to_string(),
            query,
            category,
            from: options.from,
            size: options.size,
            sort: self.sort_order(),
            highlight_fields: Vec::new(),
            suggest: None,
        })
    }

    fn sort_order(&self) -> Vec<SortKey> {
        vec![
            SortKey::Score,
            SortKey::FieldDesc(self.config.published_field.clone()),
        ]
    }

    /// One `*token*` clause per field and token, combined as a disjunction.
    fn wildcard_clause(&self, text: &str) -> Option<BooleanQuery> {
        let config = &self.config;
        let mut clause = BooleanQuery::new().with_boost(config.wildcard_boost);

        let tokens = tokenize(text)
            .into_iter()
            .filter(|t| t.chars().count() >= config.wildcard_min_chars)
            .take(config.wildcard_max_terms);

        for token in tokens {
            for field in &config.wildcard_fields {
                match WildcardQuery::containing(field.clone(), &token) {
                    Ok(wildcard) => clause.add_should(Box::new(wildcard)),
                    Err(e) => log::debug!("skipping wildcard for {token:?}: {e}"),
                }
            }
        }

        (!clause.is_empty()).then_some(clause)
    }
}
