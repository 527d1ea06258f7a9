//! In-process backend for testing and offline use.

use std::cmp::Ordering;

use ahash::AHashSet;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::backend::{BackendHit, BackendResponse, SearchBackend};
use crate::document::mapper::IndexDocument;
use crate::error::Result;
use crate::query::planner::{HIGHLIGHT_POST_TAG, HIGHLIGHT_PRE_TAG, StructuredQuery};
use crate::query::query::{Query, field_values, tokenize};
use crate::query::suggester::{CompletionSuggester, TermSuggester};
use crate::spelling::levenshtein::edit_distance_within;
use crate::spelling::suggest::{CorrectionSuggestion, SuggestionSet};

/// Words shorter than this never receive term suggestions.
const MIN_SUGGEST_WORD_LEN: usize = 4;

/// A [`SearchBackend`] that keeps documents in memory and evaluates
/// structured queries with [`Query::score`].
///
/// Ranking, paging, highlighting and suggestions follow the same request
/// fields an HTTP backend would honour, so tests and the offline CLI see the
/// same response shape as production.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Documents in insertion order; an upsert replaces in place.
    documents: RwLock<Vec<IndexDocument>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding `documents`, later duplicates replacing
    /// earlier ones.
    pub fn with_documents<I: IntoIterator<Item = IndexDocument>>(documents: I) -> Self {
        let backend = Self::new();
        {
            let mut stored = backend.documents.write();
            for doc in documents {
                upsert_into(&mut stored, doc);
            }
        }
        backend
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether no document is stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// A copy of the stored document with the given id.
    pub fn get(&self, id: &str) -> Option<IndexDocument> {
        self.documents.read().iter().find(|d| d.id == id).cloned()
    }
}

fn upsert_into(stored: &mut Vec<IndexDocument>, doc: IndexDocument) {
    match stored.iter_mut().find(|d| d.id == doc.id) {
        Some(existing) => *existing = doc,
        None => stored.push(doc),
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_index(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, doc: &IndexDocument) -> Result<()> {
        upsert_into(&mut self.documents.write(), doc.clone());
        Ok(())
    }

    async fn search(&self, query: &StructuredQuery) -> Result<BackendResponse> {
        let documents = self.documents.read();

        let mut scored: Vec<(f32, &IndexDocument)> = documents
            .iter()
            .filter_map(|doc| query.query.score(doc).map(|score| (score, doc)))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.1.published_at.cmp(&a.1.published_at))
        });

        let terms: AHashSet<String> = tokenize(&query.text).into_iter().collect();
        let highlights = |field: &str, text: &str| {
            query
                .highlight_fields
                .iter()
                .any(|f| f == field)
                .then(|| highlight(text, &terms))
                .flatten()
        };

        let total = scored.len() as u64;
        let hits = scored
            .into_iter()
            .skip(query.from)
            .take(query.size)
            .map(|(score, doc)| BackendHit {
                id: doc.id.clone(),
                score,
                highlighted_title: highlights("title", &doc.title),
                highlighted_description: highlights("description", &doc.description),
                article: doc.clone().into(),
            })
            .collect();

        let mut suggestions = SuggestionSet::new();
        if let Some(suggest) = &query.suggest {
            if let Some(term) = &suggest.term
                && let Some(corrected) = term_suggestion(&documents, term, &suggest.text)
            {
                suggestions.push_spelling(CorrectionSuggestion::backend(corrected));
            }
            if let Some(completion) = &suggest.completion {
                for text in completions(&documents, completion, &suggest.text) {
                    suggestions.push_autocomplete(text);
                }
            }
        }

        Ok(BackendResponse {
            hits,
            total,
            suggestions,
        })
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Wrap every word of `text` whose lowercase form is in `terms`.
fn highlight(text: &str, terms: &AHashSet<String>) -> Option<String> {
    let mut out = String::with_capacity(text.len() + 16);
    let mut marked = false;
    let mut rest = text;

    while let Some(first) = rest.chars().next() {
        let is_word = first.is_alphanumeric();
        let end = rest
            .find(|c: char| c.is_alphanumeric() != is_word)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        if is_word && terms.contains(&run.to_lowercase()) {
            out.push_str(HIGHLIGHT_PRE_TAG);
            out.push_str(run);
            out.push_str(HIGHLIGHT_POST_TAG);
            marked = true;
        } else {
            out.push_str(run);
        }
        rest = tail;
    }

    marked.then_some(out)
}

/// Replace each query word missing from the field vocabulary with its
/// closest vocabulary word. `None` when nothing was replaced.
fn term_suggestion(
    documents: &[IndexDocument],
    term: &TermSuggester,
    text: &str,
) -> Option<String> {
    let mut vocabulary: Vec<String> = documents
        .iter()
        .flat_map(|doc| field_values(doc, &term.field))
        .flat_map(tokenize)
        .collect::<AHashSet<_>>()
        .into_iter()
        .collect();
    vocabulary.sort();

    let mut replaced = false;
    let words: Vec<String> = tokenize(text)
        .into_iter()
        .map(|word| {
            if word.chars().count() < MIN_SUGGEST_WORD_LEN || vocabulary.contains(&word) {
                return word;
            }
            let best = vocabulary
                .iter()
                .filter_map(|candidate| {
                    edit_distance_within(&word, candidate, usize::from(term.max_edits))
                        .map(|distance| (distance, candidate))
                })
                .min_by_key(|(distance, _)| *distance);
            match best {
                Some((_, candidate)) => {
                    replaced = true;
                    candidate.clone()
                }
                None => word,
            }
        })
        .collect();

    replaced.then(|| words.join(" "))
}

/// Suggestion inputs starting with `prefix`, allowing the configured number
/// of edits within the prefix.
fn completions<'a>(
    documents: &'a [IndexDocument],
    completion: &CompletionSuggester,
    prefix: &str,
) -> Vec<&'a str> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Vec::new();
    }
    let prefix_len = prefix.chars().count();
    let edits = completion.fuzzy_edits.map(usize::from).unwrap_or(0);

    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    for input in documents.iter().flat_map(|doc| &doc.suggest.input) {
        let lowered = input.to_lowercase();
        let head: String = lowered.chars().take(prefix_len).collect();
        if edit_distance_within(&prefix, &head, edits).is_none() {
            continue;
        }
        if completion.skip_duplicates && !seen.insert(lowered) {
            continue;
        }
        out.push(input.as_str());
        if out.len() >= completion.size {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::document::article::Article;
    use crate::document::mapper::to_index_document;
    use crate::query::planner::{QueryOptions, QueryPlanner};

    fn doc(article: Article) -> IndexDocument {
        to_index_document(&article).unwrap()
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::with_documents([
            doc(Article::new("1", "OpenAI releases new model")
                .with_description("The lab shipped a frontier model.")
                .with_category("technology")
                .with_tags(["OpenAI", "AI"])
                .with_published_at(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())),
            doc(Article::new("2", "Nvidia earnings beat estimates")
                .with_description("Data center revenue soared.")
                .with_category("business")
                .with_tags(["Nvidia"])),
            doc(Article::new("3", "OpenAI signs licensing deal")
                .with_description("Publishers get paid.")
                .with_category("business")
                .with_published_at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())),
        ])
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let backend = backend();
        assert_eq!(backend.len(), 3);
        backend
            .upsert(&doc(Article::new("2", "Nvidia earnings miss")))
            .await
            .unwrap();
        assert_eq!(backend.len(), 3);
        assert_eq!(backend.get("2").unwrap().title, "Nvidia earnings miss");
    }

    #[tokio::test]
    async fn test_planned_query_ranks_and_highlights() {
        let planner = QueryPlanner::default();
        let query = planner
            .build_query("openai model", &QueryOptions::default())
            .unwrap();
        let response = backend().search(&query).await.unwrap();

        assert_eq!(response.hits[0].id, "1");
        assert_eq!(
            response.hits[0].highlighted_title.as_deref(),
            Some("<mark>OpenAI</mark> releases new <mark>model</mark>")
        );
        assert!(response.hits.iter().all(|h| h.id != "2"));
        assert_eq!(response.total, response.hits.len() as u64);
    }

    #[tokio::test]
    async fn test_category_filter_and_paging() {
        let planner = QueryPlanner::default();
        let options = QueryOptions::default().category("Business");
        let query = planner.build_query("openai", &options).unwrap();
        let response = backend().search(&query).await.unwrap();
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].id, "3");

        let paged = planner
            .build_query("openai", &QueryOptions::default().size(1).from(1))
            .unwrap();
        let response = backend().search(&paged).await.unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.hits.len(), 1);
    }

    #[tokio::test]
    async fn test_suggestions() {
        let planner = QueryPlanner::default();
        let query = planner
            .build_query("openal", &QueryOptions::default())
            .unwrap();
        let response = backend().search(&query).await.unwrap();

        assert_eq!(response.suggestions.spelling_texts(), vec!["openai"]);
        assert!(response.suggestions.has_backend_spelling());
        assert_eq!(
            response.suggestions.autocomplete,
            vec!["OpenAI releases new model", "OpenAI", "OpenAI signs licensing deal"]
        );
    }

    #[test]
    fn test_highlight() {
        let terms: AHashSet<String> = ["gpu".to_string()].into_iter().collect();
        assert_eq!(
            highlight("New GPU, old gpus", &terms).as_deref(),
            Some("New <mark>GPU</mark>, old gpus")
        );
        assert_eq!(highlight("nothing here", &terms), None);
    }
}
