//! Structured query construction.
//!
//! Clause types render into the backend's JSON query DSL and can also score
//! an [`IndexDocument`](crate::document::mapper::IndexDocument) in-process.
//! [`planner::QueryPlanner`] combines them into the multi-strategy query
//! used by the primary tier.

pub mod boolean;
pub mod fuzzy;
pub mod multi_match;
pub mod phrase;
pub mod planner;
#[allow(clippy::module_inception)]
pub mod query;
pub mod suggester;
pub mod term;
pub mod wildcard;

pub use boolean::{BooleanClause, BooleanQuery, Occur};
pub use fuzzy::FuzzyQuery;
pub use multi_match::MultiMatchQuery;
pub use phrase::PhraseQuery;
pub use planner::{PlannerConfig, QueryOptions, QueryPlanner, SortKey, StructuredQuery};
pub use query::{FieldBoost, Query};
pub use suggester::{CompletionSuggester, PhraseSuggester, SuggestRequest, TermSuggester};
pub use term::TermQuery;
pub use wildcard::WildcardQuery;
