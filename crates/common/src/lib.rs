//! Shared types for docindex
//!
//! This crate holds the record model of a documentation search index and the
//! error type used across the `docindex` crates. It has no I/O of its own.

pub mod error;
pub mod record;

// Re-export commonly used types
pub use error::{Error, Result};
pub use record::{Category, SearchIndex, SearchRecord};

/// Variable name Documenter.jl binds the index to.
pub const DEFAULT_VAR_NAME: &str = "documenterSearchIndex";

/// Key of the record array inside the wrapper object.
pub const DOCS_KEY: &str = "docs";
