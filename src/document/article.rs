//! Raw article records as supplied by ingestion and fallback endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A news article, the unit of search.
///
/// Every field except `id` is optional in practice: feeds are sloppy, and
/// `null` or missing values deserialize to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    /// Stable unique identifier. Required for indexing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Headline.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Short summary.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    /// Full body text, when the feed provides it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Single facet value, compared case-insensitively.
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    /// Publisher name.
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    /// Link to the original article.
    #[serde(deserialize_with = "null_as_default")]
    pub source_url: String,
    /// Publication time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Free-form labels.
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Article {
    /// Create a new article with an id and a title.
    pub fn new<I: Into<String>, T: Into<String>>(id: I, title: T) -> Self {
        Article {
            id: Some(id.into()),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Set the body text.
    pub fn with_content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the category.
    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = category.into();
        self
    }

    /// Set the publisher name.
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = source.into();
        self
    }

    /// Set the link to the original article.
    pub fn with_source_url<S: Into<String>>(mut self, source_url: S) -> Self {
        self.source_url = source_url.into();
        self
    }

    /// Set the publication time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The id, if present and not blank.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Whether the article belongs to `category`, case-insensitively.
    /// `None` and the `"all"` sentinel match everything.
    pub fn in_category(&self, category: Option<&str>) -> bool {
        match category.map(str::trim) {
            None => true,
            Some(c) if c.is_empty() || c.eq_ignore_ascii_case(ALL_CATEGORIES) => true,
            Some(c) => self.category.to_lowercase() == c.to_lowercase(),
        }
    }
}

/// Category filter value that means "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Normalize a category filter: `None` for no filter.
pub fn category_filter(category: Option<&str>) -> Option<&str> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_sloppy_record() {
        let json = r#"{
            "id": "a-1",
            "title": "Nvidia unveils new GPU",
            "description": null,
            "category": "Technology",
            "sourceUrl": "https://example.com/a-1",
            "publishedAt": "2024-05-01T12:00:00Z",
            "tags": null,
            "unknownField": 42
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id(), Some("a-1"));
        assert_eq!(article.description, "");
        assert!(article.tags.is_empty());
        assert_eq!(article.source, "");
        assert_eq!(article.source_url, "https://example.com/a-1");
        assert!(article.published_at.is_some());
    }

    #[test]
    fn test_blank_id_is_missing() {
        let article = Article::new("   ", "title");
        assert_eq!(article.id(), None);
        assert_eq!(Article::default().id(), None);
    }

    #[test]
    fn test_in_category() {
        let article = Article::new("1", "t").with_category("Technology");
        assert!(article.in_category(None));
        assert!(article.in_category(Some("all")));
        assert!(article.in_category(Some("ALL")));
        assert!(article.in_category(Some("technology")));
        assert!(!article.in_category(Some("sports")));
    }

    #[test]
    fn test_category_filter() {
        assert_eq!(category_filter(None), None);
        assert_eq!(category_filter(Some("All")), None);
        assert_eq!(category_filter(Some(" ")), None);
        assert_eq!(category_filter(Some("business")), Some("business"));
    }
}
