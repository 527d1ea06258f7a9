//! Search backends the orchestrator queries.
//!
//! A [`SearchBackend`] is an inverted-index service that can create the
//! article index, upsert documents and answer a
//! [`StructuredQuery`](crate::query::planner::StructuredQuery) with ranked
//! hits and suggestions. Two implementations are provided:
//!
//! - [`elasticsearch::ElasticsearchBackend`] talks to an Elasticsearch
//!   compatible server over HTTP.
//! - [`memory::MemoryBackend`] evaluates the same structured query
//!   in-process, for tests and offline use.
//!
//! The secondary tier is a simpler [`keyword::KeywordSearch`] returning flat
//! records.

pub mod elasticsearch;
pub mod keyword;
pub mod memory;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::document::article::Article;
use crate::document::mapper::IndexDocument;
use crate::error::Result;
use crate::query::planner::StructuredQuery;
use crate::spelling::suggest::SuggestionSet;

pub use elasticsearch::ElasticsearchBackend;
pub use keyword::{BackendKeywordSearch, KeywordApiClient, KeywordRecord, KeywordSearch};
pub use memory::MemoryBackend;

/// One ranked hit returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendHit {
    /// Document id.
    pub id: String,
    /// Backend relevance score. Only comparable within one response.
    pub score: f32,
    /// The stored document.
    pub article: Article,
    /// Title with matched terms wrapped in highlight markup.
    pub highlighted_title: Option<String>,
    /// Description with matched terms wrapped in highlight markup.
    pub highlighted_description: Option<String>,
}

/// A backend's answer to one structured query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendResponse {
    /// Hits in backend rank order.
    pub hits: Vec<BackendHit>,
    /// Total number of matching documents, which may exceed `hits.len()`.
    pub total: u64,
    /// Spelling and completion suggestions produced by the suggesters.
    pub suggestions: SuggestionSet,
}

/// An inverted-index search service.
#[async_trait]
pub trait SearchBackend: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Create the article index with its mapping. Succeeds if the index
    /// already exists.
    async fn create_index(&self) -> Result<()>;

    /// Insert or replace a document, keyed by its id.
    async fn upsert(&self, doc: &IndexDocument) -> Result<()>;

    /// Run a structured query.
    async fn search(&self, query: &StructuredQuery) -> Result<BackendResponse>;

    /// Whether the backend is reachable.
    async fn ping(&self) -> Result<bool>;
}
