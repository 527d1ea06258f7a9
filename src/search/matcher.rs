//! In-process fuzzy matching over a small article collection.
//!
//! The matcher needs no index and does no I/O, so it can be the only search
//! mechanism when no backend exists, or augment backend results when the
//! backend returns too little.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::article::Article;
use crate::search::result::{ResultTier, SearchResult};
use crate::spelling::corrector::{CorrectionResult, QueryCorrector};
use crate::spelling::levenshtein::similarity;

/// Bonus when the haystack contains the literal query.
const RAW_CONTAINS_BONUS: f64 = 2.0;
/// Bonus when the haystack contains the corrected query.
const CORRECTED_CONTAINS_BONUS: f64 = 1.5;
/// Weight of title similarity.
const TITLE_SIMILARITY_WEIGHT: f64 = 2.0;
/// Weight of description similarity.
const DESCRIPTION_SIMILARITY_WEIGHT: f64 = 1.0;
/// Bonus per corrected-query word found in the haystack.
const TOKEN_BONUS: f64 = 0.5;

/// Settings of the local fuzzy matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Documents scoring at or below this are dropped.
    pub threshold: f64,
    /// At most this many results are returned.
    pub max_results: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            threshold: 0.3,
            max_results: 20,
        }
    }
}

/// Scores articles against a query by substring containment and edit
/// distance similarity, after correcting the query with the dictionary.
#[derive(Debug, Clone)]
pub struct LocalFuzzyMatcher {
    corrector: Arc<QueryCorrector>,
    config: MatcherConfig,
}

impl LocalFuzzyMatcher {
    /// Create a matcher using `corrector` for query correction.
    pub fn new(corrector: Arc<QueryCorrector>, config: MatcherConfig) -> Self {
        LocalFuzzyMatcher { corrector, config }
    }

    /// Get the matcher configuration.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Rank `documents` against `query`.
    ///
    /// Documents outside `category` (case-insensitive, `"all"` matches
    /// everything) are skipped before scoring. Equal scores keep the input
    /// order.
    pub fn search(
        &self,
        documents: &[Article],
        query: &str,
        category: Option<&str>,
    ) -> Vec<SearchResult> {
        let correction = self.corrector.correct_query(query);
        self.search_corrected(documents, &correction, category)
    }

    /// Rank `documents` using a correction computed by the caller.
    pub fn search_corrected(
        &self,
        documents: &[Article],
        correction: &CorrectionResult,
        category: Option<&str>,
    ) -> Vec<SearchResult> {
        let raw = correction.original.trim().to_lowercase();
        if raw.is_empty() {
            return Vec::new();
        }
        let corrected = correction.effective_query().to_lowercase();
        let corrected_tokens: Vec<&str> = corrected.split_whitespace().collect();

        let mut results: Vec<SearchResult> = documents
            .iter()
            .filter(|doc| doc.in_category(category))
            .filter_map(|doc| {
                let score = score_document(doc, &raw, &corrected, &corrected_tokens);
                (score > self.config.threshold).then(|| {
                    SearchResult::new(doc.clone(), score, ResultTier::Local)
                        .with_corrected(correction.has_correction())
                })
            })
            .collect();

        // sort_by is stable, so ties stay in input order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(self.config.max_results);
        results
    }
}

fn score_document(doc: &Article, raw: &str, corrected: &str, corrected_tokens: &[&str]) -> f64 {
    let mut haystack = format!("{} {}", doc.title, doc.description);
    for tag in &doc.tags {
        haystack.push(' ');
        haystack.push_str(tag);
    }
    let haystack = haystack.to_lowercase();

    let mut score = 0.0;
    if haystack.contains(raw) {
        score += RAW_CONTAINS_BONUS;
    }
    if haystack.contains(corrected) {
        score += CORRECTED_CONTAINS_BONUS;
    }

    let title = similarity(raw, &doc.title).max(similarity(corrected, &doc.title));
    let description =
        similarity(raw, &doc.description).max(similarity(corrected, &doc.description));
    score += TITLE_SIMILARITY_WEIGHT * title + DESCRIPTION_SIMILARITY_WEIGHT * description;

    let found = corrected_tokens
        .iter()
        .filter(|token| haystack.contains(*token))
        .count();
    score + TOKEN_BONUS * found as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> LocalFuzzyMatcher {
        LocalFuzzyMatcher::new(Arc::new(QueryCorrector::default()), MatcherConfig::default())
    }

    fn corpus() -> Vec<Article> {
        vec![
            Article::new(
                "unrelated",
                "Quarterly municipal budget hearings scheduled for next Tuesday",
            )
            .with_description(
                "City council members will review proposed spending on roads, parks and public \
                 libraries this week.",
            )
            .with_category("politics"),
            Article::new("openai", "OpenAI releases new model")
                .with_description("The lab shipped a frontier model.")
                .with_category("technology"),
        ]
    }

    #[test]
    fn test_typo_ranks_intended_article_first() {
        let results = matcher().search(&corpus(), "OpenAl", None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "openai");
        assert!(results[0].corrected);
        assert_eq!(results[0].tier, ResultTier::Local);
    }

    #[test]
    fn test_literal_match_is_not_corrected() {
        let results = matcher().search(&corpus(), "new model", None);
        assert_eq!(results[0].id, "openai");
        assert!(!results[0].corrected);
        // contains(raw) + contains(corrected) + two tokens
        assert!(results[0].score > 2.0 + 1.5 + 1.0);
    }

    #[test]
    fn test_category_filter() {
        let results = matcher().search(&corpus(), "OpenAI", Some("politics"));
        assert!(results.is_empty());
        let results = matcher().search(&corpus(), "OpenAI", Some("ALL"));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_threshold_and_cap() {
        let docs: Vec<Article> = (0..30)
            .map(|i| Article::new(format!("{i}"), format!("Nvidia chips {i}")))
            .collect();
        let results = matcher().search(&docs, "nvidia", None);
        assert_eq!(results.len(), 20);
        // equal scores keep input order
        assert_eq!(results[0].id, "0");
        assert_eq!(results[1].id, "1");

        let strict = LocalFuzzyMatcher::new(
            Arc::new(QueryCorrector::default()),
            MatcherConfig {
                threshold: 100.0,
                max_results: 20,
            },
        );
        assert!(strict.search(&docs, "nvidia", None).is_empty());
    }

    #[test]
    fn test_search_with_precomputed_correction() {
        let corrector = QueryCorrector::default();
        let correction = corrector.correct_query("OpenAl");
        let results = matcher().search_corrected(&corpus(), &correction, None);
        assert_eq!(results[0].id, "openai");
        assert!(results[0].corrected);

        let exact = corrector.correct_query("OpenAI");
        let results = matcher().search_corrected(&corpus(), &exact, None);
        assert_eq!(results[0].id, "openai");
        assert!(results.iter().all(|r| !r.corrected));
    }

    #[test]
    fn test_blank_query() {
        assert!(matcher().search(&corpus(), "   ", None).is_empty());
    }
}
