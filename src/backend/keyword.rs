//! Secondary keyword search returning flat records.
//!
//! The secondary tier is deliberately simple: plain keyword matching with no
//! fuzziness, suggestions or highlighting. Its records are lifted into
//! [`Article`]s before they are merged with the other tiers.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::backend::SearchBackend;
use crate::document::article::{Article, category_filter, null_as_default};
use crate::error::{NewsfindError, Result};
use crate::query::planner::{QueryOptions, QueryPlanner};

/// One record returned by a keyword search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordRecord {
    /// Article id, for endpoints that expose one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    /// Publication time in whatever format the endpoint uses.
    #[serde(deserialize_with = "null_as_default")]
    pub time: String,
    /// Link to the article; stands in for the id when none is given.
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
}

impl KeywordRecord {
    /// Lift the record into an article. Without an explicit id the link
    /// stands in for it; an unparseable time is dropped.
    pub fn into_article(self) -> Article {
        let link = self.link.trim().to_string();
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| (!link.is_empty()).then(|| link.clone()));
        Article {
            id,
            title: self.title,
            description: self.description,
            content: None,
            category: self.category,
            source: self.source,
            source_url: link,
            published_at: parse_time(&self.time),
            tags: Vec::new(),
        }
    }
}

impl From<&Article> for KeywordRecord {
    fn from(article: &Article) -> Self {
        KeywordRecord {
            id: article.id().map(str::to_string),
            title: article.title.clone(),
            source: article.source.clone(),
            time: article
                .published_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            link: article.source_url.clone(),
            description: article.description.clone(),
            category: article.category.clone(),
        }
    }
}

/// Parse the time formats keyword endpoints commonly emit.
fn parse_time(time: &str) -> Option<DateTime<Utc>> {
    let time = time.trim();
    if time.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(time) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(time) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    NaiveDate::parse_from_str(time, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

/// A plain keyword search service used as the secondary tier.
#[async_trait]
pub trait KeywordSearch: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Search for `text`, optionally restricted to a category, returning at
    /// most `size` records.
    async fn search(
        &self,
        text: &str,
        category: Option<&str>,
        size: usize,
    ) -> Result<Vec<KeywordRecord>>;
}

/// Endpoints answer either with a bare array or with `{ "results": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordResponse {
    Records(Vec<KeywordRecord>),
    Wrapped { results: Vec<KeywordRecord> },
}

/// [`KeywordSearch`] over an HTTP endpoint taking `q`, `category` and
/// `size` query parameters.
#[derive(Debug, Clone)]
pub struct KeywordApiClient {
    client: Client,
    url: Url,
}

impl KeywordApiClient {
    /// Create a client for the endpoint at `url`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| {
            NewsfindError::invalid_config(format!("invalid keyword endpoint {url:?}: {e}"))
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(KeywordApiClient { client, url })
    }

    fn request_url(&self, text: &str, category: Option<&str>, size: usize) -> Url {
        let mut url = self.url.clone();
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("q", text);
            if let Some(category) = category_filter(category) {
                params.append_pair("category", category);
            }
            params.append_pair("size", &size.to_string());
        }
        url
    }
}

#[async_trait]
impl KeywordSearch for KeywordApiClient {
    fn name(&self) -> &str {
        "keyword-api"
    }

    async fn search(
        &self,
        text: &str,
        category: Option<&str>,
        size: usize,
    ) -> Result<Vec<KeywordRecord>> {
        let url = self.request_url(text, category, size);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsfindError::backend(format!(
                "keyword endpoint answered {status}"
            )));
        }

        let mut records = match response.json::<KeywordResponse>().await? {
            KeywordResponse::Records(records) => records,
            KeywordResponse::Wrapped { results } => results,
        };
        records.truncate(size);
        Ok(records)
    }
}

/// [`KeywordSearch`] that runs the planner's simple query against a
/// [`SearchBackend`], typically a second index or cluster.
#[derive(Debug, Clone)]
pub struct BackendKeywordSearch {
    backend: Arc<dyn SearchBackend>,
    planner: QueryPlanner,
}

impl BackendKeywordSearch {
    /// Create a keyword search over `backend`.
    pub fn new(backend: Arc<dyn SearchBackend>, planner: QueryPlanner) -> Self {
        BackendKeywordSearch { backend, planner }
    }
}

#[async_trait]
impl KeywordSearch for BackendKeywordSearch {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn search(
        &self,
        text: &str,
        category: Option<&str>,
        size: usize,
    ) -> Result<Vec<KeywordRecord>> {
        let mut options = QueryOptions::default().size(size).spell_check(false);
        options.category = category.map(str::to_string);
        let query = self.planner.build_simple_query(text, &options)?;
        let response = self.backend.search(&query).await?;
        Ok(response
            .hits
            .iter()
            .map(|hit| KeywordRecord::from(&hit.article))
            .collect())
    }
}
