//! Embedded full-text search over generated HTML pages: indexing with
//! coarse position bitmaps, synonym-aware conjunctive queries, and
//! highlighted snippet extraction.

pub mod counter;
pub mod error;
pub mod indexer;
pub mod model;
pub mod query;
pub mod search;
pub mod snippet;
pub mod store;
pub mod tokenizer;

pub use error::{Error, Result};
pub use indexer::Indexer;
pub use model::{Document, IndexConfiguration, Query, SearchResult, SynonymSet, Word, WordInstance};
pub use query::build_query;
pub use search::search;
pub use store::Store;

pub type DocCode = u64;
pub type WordCode = u64;
