//! HTTP backend for Elasticsearch compatible servers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{BackendHit, BackendResponse, SearchBackend};
use crate::document::article::Article;
use crate::document::mapper::{IndexDocument, index_mapping};
use crate::error::{NewsfindError, Result};
use crate::query::planner::StructuredQuery;
use crate::query::suggester::{COMPLETION_SUGGESTER, PHRASE_SUGGESTER, TERM_SUGGESTER};
use crate::spelling::suggest::{CorrectionSuggestion, SuggestionSet};

/// Response body of `_search`.
#[derive(Debug, Deserialize)]
struct SearchBody {
    hits: HitsBody,
    #[serde(default)]
    suggest: HashMap<String, Vec<SuggestEntry>>,
}

#[derive(Debug, Deserialize)]
struct HitsBody {
    total: Option<TotalHits>,
    #[serde(default)]
    hits: Vec<HitBody>,
}

/// Servers report totals either as a bare number or as `{ value, relation }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) | TotalHits::Object { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HitBody {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source", default)]
    source: Option<Article>,
    #[serde(default)]
    highlight: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SuggestEntry {
    text: String,
    #[serde(default)]
    options: Vec<SuggestOption>,
}

#[derive(Debug, Deserialize)]
struct SuggestOption {
    text: String,
}

/// A [`SearchBackend`] speaking the Elasticsearch REST API.
///
/// The index is created from [`index_mapping`]; documents are stored under
/// their article id so upserts are idempotent.
#[derive(Debug, Clone)]
pub struct ElasticsearchBackend {
    client: Client,
    base_url: Url,
    index: String,
}

impl ElasticsearchBackend {
    /// Create a backend for `index` on the server at `base_url`.
    ///
    /// `timeout` bounds every request made through this backend.
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            NewsfindError::invalid_config(format!("invalid backend url {base_url:?}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(NewsfindError::invalid_config(format!(
                "backend url {base_url} cannot hold a path"
            )));
        }
        if index.trim().is_empty() {
            return Err(NewsfindError::invalid_config("index name is empty"));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(ElasticsearchBackend {
            client,
            base_url,
            index: index.trim().to_string(),
        })
    }

    /// Get the index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Build `<base>/<index>/<segments...>` with each segment escaped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NewsfindError::backend("backend url cannot hold a path"))?
            .pop_if_empty()
            .push(&self.index)
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(NewsfindError::backend(format!(
            "backend answered {status}: {}",
            body.chars().take(300).collect::<String>()
        )))
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn create_index(&self) -> Result<()> {
        let url = self.endpoint(&[])?;
        let response = self.client.put(url).json(&index_mapping()).send().await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body: Value = response.json().await?;
            let reason = body["error"]["type"].as_str().unwrap_or_default();
            if reason == "resource_already_exists_exception" {
                log::debug!("index {} already exists", self.index);
                return Ok(());
            }
            return Err(NewsfindError::backend(format!(
                "could not create index {}: {body}",
                self.index
            )));
        }

        Self::check(response).await?;
        log::info!("created index {}", self.index);
        Ok(())
    }

    async fn upsert(&self, doc: &IndexDocument) -> Result<()> {
        let url = self.endpoint(&["_doc", &doc.id])?;
        let response = self.client.put(url).json(doc).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn search(&self, query: &StructuredQuery) -> Result<BackendResponse> {
        let url = self.endpoint(&["_search"])?;
        let response = self
            .client
            .post(url)
            .json(&query.to_json())
            .send()
            .await?;
        let body: SearchBody = Self::check(response).await?.json().await?;
        Ok(parse_search_body(body))
    }

    async fn ping(&self) -> Result<bool> {
        match self.client.get(self.base_url.clone()).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                log::debug!("ping to {} failed: {e}", self.base_url);
                Ok(false)
            }
        }
    }
}

fn parse_search_body(body: SearchBody) -> BackendResponse {
    let total = body
        .hits
        .total
        .as_ref()
        .map(TotalHits::value)
        .unwrap_or(body.hits.hits.len() as u64);

    let hits = body
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            let mut highlight = hit.highlight;
            let mut article = hit.source.unwrap_or_default();
            if article.id().is_none() {
                article.id = Some(hit.id.clone());
            }
            BackendHit {
                id: hit.id,
                score: hit.score.unwrap_or(0.0),
                article,
                highlighted_title: first_fragment(&mut highlight, "title"),
                highlighted_description: first_fragment(&mut highlight, "description"),
            }
        })
        .collect();

    BackendResponse {
        hits,
        total,
        suggestions: parse_suggestions(&body.suggest),
    }
}

fn first_fragment(highlight: &mut HashMap<String, Vec<String>>, field: &str) -> Option<String> {
    highlight
        .remove(field)
        .and_then(|fragments| fragments.into_iter().next())
}

/// Collect suggester output. Phrase options come first since they correct
/// the whole query; term options are stitched back into one query string.
fn parse_suggestions(suggest: &HashMap<String, Vec<SuggestEntry>>) -> SuggestionSet {
    let mut suggestions = SuggestionSet::new();

    if let Some(entries) = suggest.get(PHRASE_SUGGESTER) {
        for option in entries.iter().flat_map(|e| &e.options) {
            suggestions.push_spelling(CorrectionSuggestion::backend(&option.text));
        }
    }

    if let Some(entries) = suggest.get(TERM_SUGGESTER) {
        let mut replaced = false;
        let words: Vec<&str> = entries
            .iter()
            .map(|entry| match entry.options.first() {
                Some(option) => {
                    replaced = true;
                    option.text.as_str()
                }
                None => entry.text.as_str(),
            })
            .collect();
        if replaced {
            suggestions.push_spelling(CorrectionSuggestion::backend(words.join(" ")));
        }
    }

    if let Some(entries) = suggest.get(COMPLETION_SUGGESTER) {
        for option in entries.iter().flat_map(|e| &e.options) {
            suggestions.push_autocomplete(&option.text);
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_endpoint_escapes_segments() {
        let backend =
            ElasticsearchBackend::new("http://localhost:9200/", "news", Duration::from_secs(1))
                .unwrap();
        let url = backend.endpoint(&["_doc", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/news/_doc/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_config() {
        assert!(ElasticsearchBackend::new("not a url", "news", Duration::from_secs(1)).is_err());
        assert!(
            ElasticsearchBackend::new("http://localhost:9200", " ", Duration::from_secs(1))
                .is_err()
        );
    }

    #[test]
    fn test_parse_search_body() {
        let raw = json!({
            "took": 3,
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [
                    {
                        "_id": "a-1",
                        "_score": 7.5,
                        "_source": {
                            "title": "OpenAI releases new model",
                            "category": "technology",
                            "suggest": { "input": ["x"], "weight": 1 }
                        },
                        "highlight": { "title": ["<mark>OpenAI</mark> releases new model"] }
                    },
                    { "_id": "a-2", "_score": null, "_source": { "id": "a-2", "title": "Other" } }
                ]
            },
            "suggest": {
                "spelling_phrase": [
                    { "text": "openal model", "options": [{ "text": "openai model", "score": 0.4 }] }
                ],
                "spelling_term": [
                    { "text": "openal", "options": [{ "text": "openai", "score": 0.8, "freq": 3 }] },
                    { "text": "model", "options": [] }
                ],
                "autocomplete": [
                    { "text": "openal model", "options": [{ "text": "OpenAI releases new model" }] }
                ]
            }
        });
        let body: SearchBody = serde_json::from_value(raw).unwrap();
        let response = parse_search_body(body);

        assert_eq!(response.total, 42);
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].article.id.as_deref(), Some("a-1"));
        assert_eq!(
            response.hits[0].highlighted_title.as_deref(),
            Some("<mark>OpenAI</mark> releases new model")
        );
        assert_eq!(response.hits[1].score, 0.0);
        // term output stitches to the same string as the phrase output
        assert_eq!(response.suggestions.spelling_texts(), vec!["openai model"]);
        assert!(response.suggestions.has_backend_spelling());
        assert_eq!(
            response.suggestions.autocomplete,
            vec!["OpenAI releases new model"]
        );
    }

    #[test]
    fn test_parse_legacy_total() {
        let raw = json!({ "hits": { "total": 5, "hits": [] } });
        let body: SearchBody = serde_json::from_value(raw).unwrap();
        let response = parse_search_body(body);
        assert_eq!(response.total, 5);
        assert!(response.suggestions.is_empty());
    }
}
