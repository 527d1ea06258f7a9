//! Request, result and response types of the search pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::article::Article;
use crate::spelling::suggest::SuggestionSet;

/// The retrieval tier that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultTier {
    /// The structured multi-strategy query against the search backend.
    Primary,
    /// The plain keyword search.
    Secondary,
    /// The in-process fuzzy matcher.
    Local,
}

impl ResultTier {
    /// Tiers in priority order.
    pub const ALL: [ResultTier; 3] = [ResultTier::Primary, ResultTier::Secondary, ResultTier::Local];

    /// Multiplier applied to a tier's normalized scores before merging.
    pub fn weight(self) -> f64 {
        match self {
            ResultTier::Primary => 1.0,
            ResultTier::Secondary => 0.8,
            ResultTier::Local => 0.6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResultTier::Primary => "primary",
            ResultTier::Secondary => "secondary",
            ResultTier::Local => "local",
        }
    }
}

impl fmt::Display for ResultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ranked article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Article id, falling back to its url or title when the source had
    /// none.
    pub id: String,
    /// The matched article.
    pub article: Article,
    /// Relevance score. Raw within a tier, comparable across tiers once
    /// merged.
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_description: Option<String>,
    /// Whether the match came from the corrected rather than the literal
    /// query.
    pub corrected: bool,
    /// The tier that produced this result.
    pub tier: ResultTier,
}

impl SearchResult {
    /// Create a result for `article`.
    pub fn new(article: Article, score: f64, tier: ResultTier) -> Self {
        let id = article
            .id()
            .map(str::to_string)
            .or_else(|| non_blank(&article.source_url))
            .or_else(|| non_blank(&article.title))
            .unwrap_or_default();
        SearchResult {
            id,
            article,
            score,
            highlighted_title: None,
            highlighted_description: None,
            corrected: false,
            tier,
        }
    }

    /// Set the highlighted title and description.
    pub fn with_highlights(mut self, title: Option<String>, description: Option<String>) -> Self {
        self.highlighted_title = title;
        self.highlighted_description = description;
        self
    }

    /// Mark whether the result came from a corrected query.
    pub fn with_corrected(mut self, corrected: bool) -> Self {
        self.corrected = corrected;
        self
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// A search request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Raw query text.
    pub text: String,
    /// Category filter; `None` or `"all"` means every category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Maximum number of results; the configured default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Whether to request backend spelling suggestions; the configured
    /// default when absent. Dictionary correction runs regardless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_check: Option<bool>,
}

impl SearchRequest {
    /// Create a request for `text` with every option defaulted.
    pub fn new<S: Into<String>>(text: S) -> Self {
        SearchRequest {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the category filter.
    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the result size.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Enable or disable backend spelling suggestions.
    pub fn spell_check(mut self, spell_check: bool) -> Self {
        self.spell_check = Some(spell_check);
        self
    }
}

/// The answer to one [`SearchRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Merged, deduplicated results, best first.
    pub results: Vec<SearchResult>,
    /// The corrected query, when the dictionary changed at least one word.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_query: Option<String>,
    pub suggestions: SuggestionSet,
    /// Number of matches known before truncating to the requested size.
    pub total: u64,
    pub took_ms: u64,
    /// Tier of the top-ranked result; `None` when there are no results.
    pub tier: Option<ResultTier>,
    /// Set when the response is empty because tiers were unavailable
    /// rather than because nothing matched.
    pub degraded: bool,
}

impl SearchResponse {
    /// Whether the response carries no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_id_fallbacks() {
        let with_id = SearchResult::new(Article::new("a-1", "t"), 1.0, ResultTier::Primary);
        assert_eq!(with_id.id, "a-1");

        let by_url = Article {
            source_url: "https://x.example/1".to_string(),
            title: "t".to_string(),
            ..Default::default()
        };
        assert_eq!(
            SearchResult::new(by_url, 1.0, ResultTier::Secondary).id,
            "https://x.example/1"
        );

        let by_title = Article {
            title: "Only a title".to_string(),
            ..Default::default()
        };
        assert_eq!(SearchResult::new(by_title, 1.0, ResultTier::Local).id, "Only a title");
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(serde_json::to_string(&ResultTier::Local).unwrap(), "\"local\"");
        assert!(ResultTier::Primary.weight() > ResultTier::Secondary.weight());
        assert!(ResultTier::Secondary.weight() > ResultTier::Local.weight());
    }

    #[test]
    fn test_request_deserialization() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"text": "openal", "category": "all"}"#).unwrap();
        assert_eq!(request.text, "openal");
        assert_eq!(request.category.as_deref(), Some("all"));
        assert_eq!(request.size, None);
    }
}
