//! Shapes articles into the documents the search backend ingests.

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::document::article::Article;
use crate::error::{NewsfindError, Result};

/// Weight given to every suggestion entry unless a caller overrides it.
pub const DEFAULT_SUGGEST_WEIGHT: u32 = 1;

/// The completion field attached to each indexed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestField {
    /// Title, tags, source and category, deduplicated in that order.
    pub input: Vec<String>,
    /// Ranking weight for the completion suggester.
    pub weight: u32,
}

/// An article in the exact shape stored in the search index.
///
/// `suggest` is derived and rebuilt from the other fields every time a
/// document is mapped; it is never edited on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: String,
    pub source: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub suggest: SuggestField,
}

/// Map an article into its index document.
///
/// Only a missing or blank id is an error; everything else defaults so that
/// partial feed data never blocks ingestion. The mapping is pure: the same
/// article always yields the same document.
pub fn to_index_document(article: &Article) -> Result<IndexDocument> {
    let id = article
        .id()
        .ok_or_else(|| {
            NewsfindError::malformed_document(format!(
                "article {:?} has no id",
                truncate(&article.title, 60)
            ))
        })?
        .to_string();

    Ok(IndexDocument {
        id,
        title: article.title.trim().to_string(),
        description: article.description.trim().to_string(),
        content: article.content.as_deref().unwrap_or_default().trim().to_string(),
        category: article.category.trim().to_string(),
        source: article.source.trim().to_string(),
        source_url: article.source_url.trim().to_string(),
        published_at: article.published_at,
        tags: article
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        suggest: suggest_field(article),
    })
}

/// Build the completion input for an article.
pub fn suggest_field(article: &Article) -> SuggestField {
    let mut seen = AHashSet::new();
    let mut input = Vec::new();

    let candidates = std::iter::once(article.title.as_str())
        .chain(article.tags.iter().map(String::as_str))
        .chain([article.source.as_str(), article.category.as_str()]);

    for candidate in candidates {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        if seen.insert(candidate.to_lowercase()) {
            input.push(candidate.to_string());
        }
    }

    SuggestField {
        input,
        weight: DEFAULT_SUGGEST_WEIGHT,
    }
}

impl From<IndexDocument> for Article {
    fn from(doc: IndexDocument) -> Self {
        Article {
            id: Some(doc.id),
            title: doc.title,
            description: doc.description,
            content: (!doc.content.is_empty()).then_some(doc.content),
            category: doc.category,
            source: doc.source,
            source_url: doc.source_url,
            published_at: doc.published_at,
            tags: doc.tags,
        }
    }
}

/// Index settings and mappings for the article index.
///
/// Text fields carry a `keyword` sub-field for exact matching; `suggest` is a
/// completion field fed by [`suggest_field`].
pub fn index_mapping() -> Value {
    json!({
        "settings": {
            "analysis": {
                "analyzer": {
                    "trigram": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "shingle"]
                    }
                },
                "filter": {
                    "shingle": {
                        "type": "shingle",
                        "min_shingle_size": 2,
                        "max_shingle_size": 3
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "fields": {
                        "keyword": { "type": "keyword", "ignore_above": 256 },
                        "trigram": { "type": "text", "analyzer": "trigram" }
                    }
                },
                "description": { "type": "text" },
                "content": { "type": "text" },
                "category": { "type": "keyword" },
                "source": { "type": "keyword" },
                "sourceUrl": { "type": "keyword" },
                "publishedAt": { "type": "date" },
                "tags": { "type": "keyword" },
                "suggest": { "type": "completion" }
            }
        }
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
