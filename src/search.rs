//! The search pipeline.
//!
//! - [`matcher::LocalFuzzyMatcher`] ranks an in-memory article collection
//!   with no backend at all
//! - [`cascade::Cascade`] decides which tier runs next
//! - [`merge::ResultMerger`] normalizes, deduplicates and ranks the results
//!   of several tiers
//! - [`orchestrator::SearchOrchestrator`] ties them together behind one
//!   `search` call

pub mod cascade;
pub mod matcher;
pub mod merge;
pub mod orchestrator;
pub mod result;

pub use cascade::{Cascade, CascadeState, CascadeThresholds, TierOutcome};
pub use matcher::{LocalFuzzyMatcher, MatcherConfig};
pub use merge::ResultMerger;
pub use orchestrator::{SearchOrchestrator, SearchSettings};
pub use result::{ResultTier, SearchRequest, SearchResponse, SearchResult};
