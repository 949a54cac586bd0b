//! `docindex mcp`

use std::sync::Arc;

use super::{GlobalArgs, Session, finish};

/// Load the index and serve it over MCP on stdio.
pub async fn run(global: &GlobalArgs) -> i32 {
    finish(run_inner(global).await)
}

async fn run_inner(global: &GlobalArgs) -> Result<(), String> {
    let session = Session::open(global)?;
    let index = session.load_index()?;
    let defaults = session.settings.search_options();
    docindex_mcp::run_server(Arc::new(index), defaults, session.index_path).await
}
