//! MCP (Model Context Protocol) server for docindex.
//!
//! Exposes a loaded documentation search index to MCP clients over stdio:
//! tools for ranked search, location lookup and page listing, and a stats
//! resource.

pub mod protocol;
pub mod server;

pub use protocol::{McpServer, ToolResult};
pub use server::{AppContext, build_server};

use std::path::PathBuf;
use std::sync::Arc;

use docindex_core::{DocIndex, SearchOptions};

/// Serve `index` on stdin/stdout until the client disconnects.
pub async fn run_server(
    index: Arc<DocIndex>,
    defaults: SearchOptions,
    source: PathBuf,
) -> Result<(), String> {
    tracing::info!(
        "Serving {} records from {} over MCP",
        index.len(),
        source.display()
    );
    let server = build_server(AppContext {
        index,
        defaults,
        source,
    });
    server.run_stdio().await
}
