//! Core of docindex: reading, validating, querying and producing
//! documentation search-index artifacts.
//!
//! The artifact is the `search_index.js` file documentation generators emit
//! for client-side search. [`codec`] turns it into a [`SearchIndex`],
//! [`validate`] checks it against the format invariants, and
//! [`search::DocIndex`] answers location lookups and full-text queries over
//! it the way the browser widget does.

pub mod builder;
pub mod codec;
pub mod common;
pub mod config;
pub mod logging;
pub mod search;
pub mod slug;
pub mod validate;

pub use builder::IndexBuilder;
pub use codec::{OutputFormat, ParseMode, ParseOutcome};
pub use common::Timer;
pub use config::Settings;
pub use search::{Combine, DocIndex, SearchHit, SearchMode, SearchOptions};
pub use validate::{Issue, IssueKind, Severity, ValidationReport};

pub use docindex_common::{Category, Error, Result, SearchIndex, SearchRecord};
