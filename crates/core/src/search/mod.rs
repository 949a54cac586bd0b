//! In-memory lookup and full-text search over a loaded index.
//!
//! This mirrors what the browser-side search widget does with the artifact:
//! exact location lookups for navigation and token search over `title` and
//! `text`, titles weighted higher than body text.

pub mod docs_index;
pub mod tokenize;

pub use docs_index::{
    Combine, DocIndex, IndexStats, PageSummary, SearchHit, SearchMode, SearchOptions,
};
