//! Integration tests for article ingestion and primary-tier search

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use newsfind::backend::{MemoryBackend, SearchBackend};
use newsfind::document::jsonl::load_articles;
use newsfind::document::mapper::to_index_document;
use newsfind::error::NewsfindError;
use newsfind::search::{MatcherConfig, ResultTier, SearchOrchestrator, SearchRequest};
use newsfind::spelling::QueryCorrector;

const FEED: &str = r#"
{"id": "n-1", "title": "Nvidia unveils new GPU", "description": "The chip targets data centers.", "category": "technology", "source": "Wire", "sourceUrl": "https://news.example/n-1", "publishedAt": "2026-03-01T09:00:00Z", "tags": ["GPU", " chips "]}
{"id": "n-2", "title": "OpenAI releases new model", "description": "A frontier model ships.", "category": "technology", "tags": ["AI"]}
{"id": "n-3", "title": "Markets rally on rate cut hopes", "description": null, "category": "business"}
this line is not json
{"title": "Article without an id", "category": "business"}
"#;

fn feed_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{FEED}").unwrap();
    file
}

#[test]
fn test_mapping_is_idempotent() {
    let articles = load_articles(feed_file().path()).unwrap();
    assert_eq!(articles.len(), 4);

    for article in articles.iter().filter(|a| a.id().is_some()) {
        let first = to_index_document(article).unwrap();
        let second = to_index_document(article).unwrap();
        assert_eq!(first, second);
    }

    let nvidia = to_index_document(&articles[0]).unwrap();
    assert_eq!(nvidia.tags, vec!["GPU", "chips"]);
    assert_eq!(
        nvidia.suggest.input,
        vec!["Nvidia unveils new GPU", "GPU", "chips", "Wire", "technology"]
    );

    assert!(matches!(
        to_index_document(&articles[3]),
        Err(NewsfindError::MalformedDocument(_))
    ));
}

#[tokio::test]
async fn test_ingest_then_search() {
    let backend = Arc::new(MemoryBackend::new());
    let orchestrator =
        SearchOrchestrator::new(Arc::new(QueryCorrector::default()), MatcherConfig::default())
            .with_primary(backend.clone(), Duration::from_secs(1));

    orchestrator.create_index().await.unwrap();
    assert!(backend.ping().await.unwrap());

    let articles = load_articles(feed_file().path()).unwrap();
    let flags = orchestrator.index_articles(&articles).await;
    assert_eq!(flags, vec![true, true, true, false]);
    assert_eq!(backend.len(), 3);

    // re-ingesting the same feed replaces documents instead of duplicating
    orchestrator.index_articles(&articles).await;
    assert_eq!(backend.len(), 3);

    let response = orchestrator
        .search(&SearchRequest::new("Nvidai GPU").category("technology"))
        .await;
    assert_eq!(response.results[0].id, "n-1");
    assert_eq!(response.results[0].tier, ResultTier::Primary);
    assert_eq!(response.corrected_query.as_deref(), Some("Nvidia GPU"));
    assert!(
        response.results[0]
            .highlighted_title
            .as_deref()
            .is_some_and(|title| title.contains("<mark>"))
    );
    assert!(response.results.iter().all(|r| r.article.category == "technology"));

    let response = orchestrator
        .search(&SearchRequest::new("rally").category("business"))
        .await;
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].id, "n-3");
}
