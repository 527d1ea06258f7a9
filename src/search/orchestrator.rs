//! The fallback orchestrator: one entry point that runs the cascade.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::backend::keyword::KeywordSearch;
use crate::backend::{BackendResponse, SearchBackend};
use crate::document::article::{Article, category_filter};
use crate::document::mapper::to_index_document;
use crate::error::{NewsfindError, Result};
use crate::query::planner::{QueryOptions, QueryPlanner};
use crate::search::cascade::{Cascade, CascadeThresholds, TierOutcome};
use crate::search::matcher::{LocalFuzzyMatcher, MatcherConfig};
use crate::search::merge::ResultMerger;
use crate::search::result::{ResultTier, SearchRequest, SearchResponse, SearchResult};
use crate::spelling::corrector::{CorrectionResult, QueryCorrector};
use crate::spelling::suggest::SuggestionSet;

/// Default timeout of the primary tier.
pub const DEFAULT_PRIMARY_TIMEOUT: Duration = Duration::from_secs(3);
/// Default timeout of the secondary tier.
pub const DEFAULT_SECONDARY_TIMEOUT: Duration = Duration::from_secs(5);

/// Upserts in flight at once during bulk ingestion.
const INGEST_CONCURRENCY: usize = 4;

/// Request defaults and cascade thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results returned when a request gives no size.
    pub default_size: usize,
    /// Trimmed queries shorter than this are rejected without any backend
    /// call.
    pub min_query_chars: usize,
    /// Whether to request backend suggestions when a request does not say.
    pub spell_check: bool,
    /// Spelling and completion suggestions kept per response.
    pub max_suggestions: usize,
    #[serde(flatten)]
    pub thresholds: CascadeThresholds,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            default_size: 10,
            min_query_chars: 2,
            spell_check: true,
            max_suggestions: 5,
            thresholds: CascadeThresholds::default(),
        }
    }
}

/// Runs searches through the primary backend, the secondary keyword search
/// and the local fuzzy matcher, and merges what they return.
///
/// Every field is shared and immutable, so an orchestrator can be cloned
/// freely and used from concurrent tasks.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use newsfind::document::article::Article;
/// use newsfind::search::matcher::MatcherConfig;
/// use newsfind::search::orchestrator::SearchOrchestrator;
/// use newsfind::search::result::SearchRequest;
/// use newsfind::spelling::corrector::QueryCorrector;
///
/// # #[tokio::main]
/// # async fn main() {
/// let orchestrator = SearchOrchestrator::new(
///     Arc::new(QueryCorrector::default()),
///     MatcherConfig::default(),
/// )
/// .with_corpus(vec![Article::new("a-1", "OpenAI releases new model")]);
///
/// let response = orchestrator.search(&SearchRequest::new("OpenAl")).await;
/// assert_eq!(response.results[0].id, "a-1");
/// assert_eq!(response.corrected_query.as_deref(), Some("OpenAI"));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SearchOrchestrator {
    corrector: Arc<QueryCorrector>,
    planner: QueryPlanner,
    matcher: LocalFuzzyMatcher,
    primary: Option<Arc<dyn SearchBackend>>,
    primary_timeout: Duration,
    secondary: Option<Arc<dyn KeywordSearch>>,
    secondary_timeout: Duration,
    corpus: Arc<Vec<Article>>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    /// Create an orchestrator with only the local tier and default settings.
    pub fn new(corrector: Arc<QueryCorrector>, matcher: MatcherConfig) -> Self {
        SearchOrchestrator {
            matcher: LocalFuzzyMatcher::new(Arc::clone(&corrector), matcher),
            corrector,
            planner: QueryPlanner::default(),
            primary: None,
            primary_timeout: DEFAULT_PRIMARY_TIMEOUT,
            secondary: None,
            secondary_timeout: DEFAULT_SECONDARY_TIMEOUT,
            corpus: Arc::new(Vec::new()),
            settings: SearchSettings::default(),
        }
    }

    /// Use `planner` for primary queries.
    pub fn with_planner(mut self, planner: QueryPlanner) -> Self {
        self.planner = planner;
        self
    }

    /// Set the primary backend and its timeout.
    pub fn with_primary(mut self, backend: Arc<dyn SearchBackend>, timeout: Duration) -> Self {
        self.primary = Some(backend);
        self.primary_timeout = timeout;
        self
    }

    /// Set the secondary keyword search and its timeout.
    pub fn with_secondary(mut self, search: Arc<dyn KeywordSearch>, timeout: Duration) -> Self {
        self.secondary = Some(search);
        self.secondary_timeout = timeout;
        self
    }

    /// Set the articles the local tier searches.
    pub fn with_corpus(mut self, corpus: Vec<Article>) -> Self {
        self.corpus = Arc::new(corpus);
        self
    }

    /// Set request defaults and cascade thresholds.
    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get the query corrector.
    pub fn corrector(&self) -> &QueryCorrector {
        &self.corrector
    }

    /// Get the query planner.
    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    /// Get the settings.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Run one search through the cascade.
    ///
    /// Never fails: unavailable tiers are logged and skipped. When every
    /// attempted tier was unavailable and nothing matched locally, the
    /// response is empty, carries no corrected query, and has `degraded`
    /// set.
    pub async fn search(&self, request: &SearchRequest) -> SearchResponse {
        let started = Instant::now();
        let text = request.text.trim();

        if text.chars().count() < self.settings.min_query_chars {
            log::debug!(
                "rejecting query {text:?}: shorter than {} characters",
                self.settings.min_query_chars
            );
            return SearchResponse {
                took_ms: elapsed_ms(started),
                ..Default::default()
            };
        }

        let size = request.size.unwrap_or(self.settings.default_size);
        let spell_check = request.spell_check.unwrap_or(self.settings.spell_check);
        let category = category_filter(request.category.as_deref());
        let correction = self.corrector.correct_query(text);
        let effective = correction.effective_query();
        if let Some(corrected) = correction.corrected_query() {
            log::debug!("corrected {text:?} to {corrected:?}");
        }

        let mut cascade = Cascade::new(self.settings.thresholds);
        let mut merger = ResultMerger::new();
        let mut backend_suggestions = SuggestionSet::new();
        let mut primary_total = 0;
        let mut secondary_articles = Vec::new();

        while let Some(tier) = cascade.next_tier() {
            log::debug!("trying {tier} tier for {effective:?}");
            let outcome = match tier {
                ResultTier::Primary => match &self.primary {
                    None => TierOutcome::Skipped,
                    Some(backend) => {
                        let mut options = QueryOptions::default()
                            .size(size)
                            .spell_check(spell_check);
                        options.category = category.map(str::to_string);
                        match self.query_primary(backend.as_ref(), effective, &options).await {
                            Ok(response) => {
                                primary_total = response.total;
                                backend_suggestions = response.suggestions;
                                let results: Vec<SearchResult> = response
                                    .hits
                                    .into_iter()
                                    .map(|hit| {
                                        let mut result = SearchResult::new(
                                            hit.article,
                                            f64::from(hit.score),
                                            ResultTier::Primary,
                                        )
                                        .with_highlights(
                                            hit.highlighted_title,
                                            hit.highlighted_description,
                                        )
                                        .with_corrected(correction.has_correction());
                                        result.id = hit.id;
                                        result
                                    })
                                    .collect();
                                TierOutcome::Hits(merger.add_tier(tier, results))
                            }
                            Err(e) => {
                                log::warn!("primary tier ({}) unavailable: {e}", backend.name());
                                TierOutcome::Failed
                            }
                        }
                    }
                },
                ResultTier::Secondary => match &self.secondary {
                    None => TierOutcome::Skipped,
                    Some(search) => {
                        let records = with_timeout(
                            self.secondary_timeout,
                            search.search(effective, category, size),
                        )
                        .await;
                        match records {
                            Ok(records) => {
                                let count = records.len();
                                let results: Vec<SearchResult> = records
                                    .into_iter()
                                    .enumerate()
                                    .map(|(rank, record)| {
                                        let article = record.into_article();
                                        secondary_articles.push(article.clone());
                                        // rank-based, the endpoint returns no scores
                                        let score = (count - rank) as f64 / count as f64;
                                        SearchResult::new(article, score, ResultTier::Secondary)
                                            .with_corrected(correction.has_correction())
                                    })
                                    .collect();
                                TierOutcome::Hits(merger.add_tier(tier, results))
                            }
                            Err(e) => {
                                log::warn!("secondary tier ({}) unavailable: {e}", search.name());
                                TierOutcome::Failed
                            }
                        }
                    }
                },
                ResultTier::Local => {
                    let results = if secondary_articles.is_empty() {
                        self.matcher
                            .search_corrected(&self.corpus, &correction, category)
                    } else {
                        let candidates: Vec<Article> = self
                            .corpus
                            .iter()
                            .chain(&secondary_articles)
                            .cloned()
                            .collect();
                        self.matcher
                            .search_corrected(&candidates, &correction, category)
                    };
                    TierOutcome::Hits(merger.add_tier(tier, results))
                }
            };
            cascade.record(tier, outcome);
        }

        let mut results = merger.merge();
        let total = primary_total.max(results.len() as u64);
        results.truncate(size);

        let degraded = results.is_empty() && !cascade.failed_tiers().is_empty();
        let tier = results.first().map(|r| r.tier);
        let took_ms = elapsed_ms(started);

        if degraded {
            log::warn!(
                "no results for {text:?}: {:?} unavailable ({took_ms} ms)",
                cascade.failed_tiers()
            );
            return SearchResponse {
                total: 0,
                took_ms,
                degraded,
                ..Default::default()
            };
        }

        match tier {
            Some(tier) => log::info!(
                "{text:?} answered by {tier} tier: {} of {total} results ({took_ms} ms)",
                results.len()
            ),
            None => log::info!("{text:?} matched nothing ({took_ms} ms)"),
        }

        SearchResponse {
            results,
            corrected_query: correction.corrected_query().map(str::to_string),
            suggestions: self.suggestions(backend_suggestions, &correction),
            total,
            took_ms,
            tier,
            degraded,
        }
    }

    async fn query_primary(
        &self,
        backend: &dyn SearchBackend,
        text: &str,
        options: &QueryOptions,
    ) -> Result<BackendResponse> {
        let query = self.planner.build_query(text, options)?;
        with_timeout(self.primary_timeout, backend.search(&query)).await
    }

    /// Backend spelling suggestions when there are any, else the dictionary
    /// correction; completions always come from the backend.
    fn suggestions(&self, backend: SuggestionSet, correction: &CorrectionResult) -> SuggestionSet {
        let mut suggestions = backend;
        if !suggestions.has_backend_spelling()
            && let Some(suggestion) = correction.suggestion()
        {
            suggestions.push_spelling(suggestion);
        }
        suggestions.truncate(self.settings.max_suggestions);
        suggestions
    }

    /// Create the primary index if it does not exist.
    pub async fn create_index(&self) -> Result<()> {
        let backend = self
            .primary
            .as_ref()
            .ok_or_else(|| NewsfindError::backend("no primary backend configured"))?;
        with_timeout(self.primary_timeout, backend.create_index()).await
    }

    /// Map and upsert one article into the primary backend.
    ///
    /// Returns `false` when the article has no id or the backend rejects or
    /// misses the write; the reason is logged.
    pub async fn index_article(&self, article: &Article) -> bool {
        let Some(backend) = &self.primary else {
            log::warn!("cannot index: no primary backend configured");
            return false;
        };
        let doc = match to_index_document(article) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("rejecting article: {e}");
                return false;
            }
        };
        match with_timeout(self.primary_timeout, backend.upsert(&doc)).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to index {}: {e}", doc.id);
                false
            }
        }
    }

    /// Index many articles, one upsert each. The flags line up with
    /// `articles`.
    pub async fn index_articles(&self, articles: &[Article]) -> Vec<bool> {
        stream::iter(articles)
            .map(|article| self.index_article(article))
            .buffered(INGEST_CONCURRENCY)
            .collect()
            .await
    }
}

async fn with_timeout<T, F>(timeout: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| NewsfindError::Timeout(timeout))?
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
