//! Error types for the newsfind library.
//!
//! All fallible operations return [`NewsfindError`]. Most variants describe a
//! *tier-unavailable* condition (backend unreachable, timed out, or answering
//! with garbage); the search orchestrator recovers from those by advancing the
//! fallback cascade, so they rarely reach callers of
//! [`SearchOrchestrator::search`](crate::search::orchestrator::SearchOrchestrator::search).
//!
//! # Examples
//!
//! ```
//! use newsfind::error::{NewsfindError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(NewsfindError::malformed_document("missing id"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;
use std::time::Duration;

use thiserror::Error;

/// The main error type for newsfind operations.
#[derive(Error, Debug)]
pub enum NewsfindError {
    /// I/O errors (reading corpora, config files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HTTP transport errors talking to a backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The search backend answered, but not successfully.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A network-bound tier did not answer in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// An article could not be mapped into an index document.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A query could not be built.
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with NewsfindError.
pub type Result<T> = std::result::Result<T, NewsfindError>;

impl NewsfindError {
    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        NewsfindError::Backend(msg.into())
    }

    /// Create a new malformed document error.
    pub fn malformed_document<S: Into<String>>(msg: S) -> Self {
        NewsfindError::MalformedDocument(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        NewsfindError::Query(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        NewsfindError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        NewsfindError::Other(msg.into())
    }

    /// Whether this error means a search tier is unavailable and the cascade
    /// should move on rather than fail.
    pub fn is_tier_unavailable(&self) -> bool {
        matches!(
            self,
            NewsfindError::Io(_)
                | NewsfindError::Http(_)
                | NewsfindError::Json(_)
                | NewsfindError::Backend(_)
                | NewsfindError::Timeout(_)
        )
    }
}
