//! # newsfind
//!
//! Typo-tolerant news search that degrades gracefully.
//!
//! A query is corrected against a dictionary of domain terms, planned into a
//! multi-strategy backend query, and run through a cascade of tiers:
//!
//! 1. the primary full-text backend (Elasticsearch over HTTP),
//! 2. a secondary keyword endpoint,
//! 3. an in-process fuzzy matcher over a local article collection.
//!
//! Each tier only runs when the ones before it failed or returned too
//! little. Results are normalized per tier, deduplicated and ranked, so a
//! search always answers, even with no backend reachable.
//!
//! ## Features
//!
//! - Damerau-Levenshtein similarity and dictionary-based query correction
//! - Phrase, best-fields, fuzzy and wildcard strategies in one boolean query
//! - Spelling and autocomplete suggestions from backend suggesters or the
//!   local dictionary
//! - Per-tier timeouts and an explicit fallback state machine
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use newsfind::document::article::Article;
//! use newsfind::search::{MatcherConfig, SearchOrchestrator, SearchRequest};
//! use newsfind::spelling::QueryCorrector;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let corrector = Arc::new(QueryCorrector::default());
//! let orchestrator = SearchOrchestrator::new(corrector, MatcherConfig::default())
//!     .with_corpus(vec![Article::new("1", "OpenAI releases new model")]);
//!
//! let response = runtime.block_on(orchestrator.search(&SearchRequest::new("OpenAl")));
//! assert_eq!(response.corrected_query.as_deref(), Some("OpenAI"));
//! assert_eq!(response.results[0].id, "1");
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod search;
pub mod spelling;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
