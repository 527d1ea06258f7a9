//! Article records and their index representation.
//!
//! - [`article::Article`] - raw article as supplied by ingestion or a
//!   fallback endpoint
//! - [`mapper::to_index_document`] - shapes an article into the document the
//!   search backend stores, including the derived `suggest` field
//! - [`jsonl`] - reads articles from JSON Lines files
//!
//! # Examples
//!
//! ```
//! use newsfind::document::article::Article;
//! use newsfind::document::mapper::to_index_document;
//!
//! let article = Article::new("a-1", "Nvidia unveils new GPU")
//!     .with_category("technology")
//!     .with_tags(["Nvidia", "GPU"]);
//!
//! let doc = to_index_document(&article).unwrap();
//! assert_eq!(doc.suggest.input[0], "Nvidia unveils new GPU");
//! ```

pub mod article;
pub mod jsonl;
pub mod mapper;

pub use article::{ALL_CATEGORIES, Article, category_filter};
pub use mapper::{IndexDocument, SuggestField, index_mapping, to_index_document};
