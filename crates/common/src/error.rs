//! Error type shared by the docindex crates.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, validating or assembling a search index.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not a recognizable index (bad wrapper or JSON).
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// A single record failed to decode.
    #[error("Malformed record at position {index}: {reason}")]
    MalformedRecord {
        /// Zero-based position in the record array.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Category tag outside `section`, `page`, `method`.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    /// Two anchored records share a location.
    #[error("Duplicate anchor '{location}'")]
    DuplicateAnchor {
        /// The colliding location.
        location: String,
    },

    /// A method record without docstring text.
    #[error("Method record '{location}' has an empty docstring")]
    EmptyDocstring {
        /// Location of the offending record.
        location: String,
    },

    /// JSON encoding or decoding failed outside a single record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The index builder was used out of order.
    #[error("Index builder error: {0}")]
    Builder(String),

    /// Configuration file could not be loaded.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Build an [`Error::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
