//! Small helpers shared by the core modules.

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Places a documentation build usually leaves its search index, relative to
/// the project root.
pub const INDEX_CANDIDATES: &[&str] = &[
    "docs/build/search_index.js",
    "build/search_index.js",
    "search_index.js",
];

/// Return the first existing candidate index file under `root`.
pub fn find_index_file(root: &Path) -> Option<PathBuf> {
    INDEX_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

/// Timer utility for measuring and logging elapsed time
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Start a new timer with a label
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        tracing::debug!("⏱️  [{}] Starting...", label);
        Self {
            start: Instant::now(),
            label,
        }
    }

    /// Log elapsed time and return duration in milliseconds
    pub fn lap(&self, step: &str) -> u128 {
        let elapsed = self.start.elapsed();
        let ms = elapsed.as_millis();
        tracing::debug!(
            "⏱️  [{}] {} took {}ms ({:.2}s)",
            self.label,
            step,
            ms,
            elapsed.as_secs_f64()
        );
        ms
    }

    /// Log final elapsed time
    pub fn finish(self) -> u128 {
        let elapsed = self.start.elapsed();
        let ms = elapsed.as_millis();
        tracing::debug!(
            "⏱️  [{}] COMPLETED in {}ms ({:.2}s)",
            self.label,
            ms,
            elapsed.as_secs_f64()
        );
        ms
    }
}
