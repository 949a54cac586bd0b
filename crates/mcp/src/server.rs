//! Docindex tools and resources on top of [`McpServer`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use docindex_common::{Category, SearchRecord};
use docindex_core::{DocIndex, SearchMode, SearchOptions};

use crate::protocol::{McpServer, ToolResult};

/// URI of the stats resource.
pub const STATS_URI: &str = "docindex://stats";

/// State shared by every handler.
#[derive(Debug)]
pub struct AppContext {
    /// The loaded index.
    pub index: Arc<DocIndex>,
    /// Search defaults from configuration.
    pub defaults: SearchOptions,
    /// File the index was read from.
    pub source: PathBuf,
}

/// Server with the docindex tools registered.
pub fn build_server(ctx: AppContext) -> McpServer<AppContext> {
    McpServer::new("docindex", env!("CARGO_PKG_VERSION"), ctx)
        .resource(
            STATS_URI,
            "index-stats",
            "Record counts and content digest of the loaded search index",
            "application/json",
            stats_resource,
        )
        .tool(
            "search_docs",
            "Search the documentation index. Returns ranked records with their locations.",
            search_docs_tool,
        )
        .tool(
            "lookup_location",
            "Get every record at an exact location such as 'apireference/#Module.func'",
            lookup_location_tool,
        )
        .tool(
            "list_pages",
            "List documentation pages with their record counts",
            list_pages_tool,
        )
}

// --- Resources ---

#[derive(Serialize)]
struct StatsResponse<'a> {
    source: String,
    #[serde(flatten)]
    stats: &'a docindex_core::search::IndexStats,
}

async fn stats_resource(ctx: Arc<AppContext>) -> Result<String, String> {
    let stats = ctx.index.stats().map_err(|e| e.to_string())?;
    let response = StatsResponse {
        source: ctx.source.display().to_string(),
        stats: &stats,
    };
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to serialize stats: {e}"))
}

// --- Tools ---

/// Category filter accepted by `search_docs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    /// Headings
    Section,
    /// Page titles and paragraphs
    Page,
    /// Docstrings
    Method,
}

impl From<CategoryFilter> for Category {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::Section => Category::Section,
            CategoryFilter::Page => Category::Page,
            CategoryFilter::Method => Category::Method,
        }
    }
}

/// Matching mode accepted by `search_docs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModeArg {
    /// Ranked token matching with prefix expansion
    Token,
    /// Case-insensitive substring over title and text
    Substring,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Token => SearchMode::Token,
            ModeArg::Substring => SearchMode::Substring,
        }
    }
}

/// Arguments of `search_docs`.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchDocsArgs {
    /// Search query, e.g. "cross interpolation"
    pub query: String,
    /// Maximum number of results; 0 returns every match
    #[serde(default)]
    pub limit: Option<usize>,
    /// Restrict to one category
    #[serde(default)]
    pub category: Option<CategoryFilter>,
    /// Matching mode, token by default
    #[serde(default)]
    pub mode: Option<ModeArg>,
}

/// Arguments of `lookup_location`.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupLocationArgs {
    /// Exact record location
    pub location: String,
}

/// `list_pages` takes no arguments.
#[derive(Debug, Clone, Copy, Deserialize, schemars::JsonSchema)]
pub struct EmptyArgs {}

#[derive(Serialize)]
struct SearchResponse<'a> {
    query: String,
    total: usize,
    results: Vec<SearchResult<'a>>,
}

#[derive(Serialize)]
struct SearchResult<'a> {
    location: &'a str,
    page: &'a str,
    title: &'a str,
    category: Category,
    score: f64,
    snippet: String,
}

const SNIPPET_CHARS: usize = 240;

fn snippet(record: &SearchRecord) -> String {
    let text = record.text.trim();
    if text.chars().count() <= SNIPPET_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(SNIPPET_CHARS).collect();
    format!("{cut}...")
}

fn search_options(defaults: &SearchOptions, args: &SearchDocsArgs) -> SearchOptions {
    let mut options = defaults.clone();
    if let Some(limit) = args.limit {
        options.limit = limit;
    }
    if let Some(category) = args.category {
        options.categories = vec![category.into()];
    }
    if let Some(mode) = args.mode {
        options.mode = mode.into();
    }
    options
}

async fn search_docs_tool(ctx: Arc<AppContext>, args: SearchDocsArgs) -> ToolResult {
    let options = search_options(&ctx.defaults, &args);

    let hits = ctx.index.search(&args.query, &options);
    let response = SearchResponse {
        total: hits.len(),
        results: hits
            .iter()
            .map(|hit| SearchResult {
                location: &hit.record.location,
                page: &hit.record.page,
                title: &hit.record.title,
                category: hit.record.category,
                score: hit.score,
                snippet: snippet(hit.record),
            })
            .collect(),
        query: args.query,
    };
    ToolResult::json(&response)
}

async fn lookup_location_tool(ctx: Arc<AppContext>, args: LookupLocationArgs) -> ToolResult {
    let records = ctx.index.lookup(&args.location);
    if records.is_empty() {
        return ToolResult::error(format!("No records at location '{}'", args.location));
    }
    ToolResult::json(&records)
}

async fn list_pages_tool(ctx: Arc<AppContext>, _args: EmptyArgs) -> ToolResult {
    ToolResult::json(&ctx.index.pages())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn args(category: Option<CategoryFilter>, mode: Option<ModeArg>) -> SearchDocsArgs {
        SearchDocsArgs {
            query: "q".to_string(),
            limit: Some(3),
            category,
            mode,
        }
    }

    #[test]
    fn test_search_options_from_args() {
        let defaults = SearchOptions::default();
        let options = search_options(
            &defaults,
            &args(Some(CategoryFilter::Method), Some(ModeArg::Substring)),
        );
        assert_eq!(options.limit, 3);
        assert_eq!(options.categories, vec![Category::Method]);
        assert_eq!(options.mode, SearchMode::Substring);
        assert!((options.title_boost - defaults.title_boost).abs() < f64::EPSILON);

        let options = search_options(&defaults, &args(None, None));
        assert!(options.categories.is_empty());
        assert_eq!(options.mode, defaults.mode);
    }

    #[test]
    fn test_search_args_reject_bad_values() {
        let good = serde_json::json!({"query": "q", "category": "method", "mode": "substring"});
        let parsed: SearchDocsArgs = serde_json::from_value(good).unwrap();
        assert_eq!(parsed.category, Some(CategoryFilter::Method));
        assert_eq!(parsed.mode, Some(ModeArg::Substring));

        let bad_category = serde_json::json!({"query": "q", "category": "function"});
        assert!(serde_json::from_value::<SearchDocsArgs>(bad_category).is_err());
        let bad_mode = serde_json::json!({"query": "q", "mode": "fuzzy"});
        assert!(serde_json::from_value::<SearchDocsArgs>(bad_mode).is_err());
    }

    #[test]
    fn test_search_args_schema_lists_choices() {
        let schema = serde_json::to_string(&schemars::schema_for!(SearchDocsArgs)).unwrap();
        for choice in ["section", "page", "method", "token", "substring"] {
            assert!(schema.contains(&format!("\"{choice}\"")), "missing {choice}");
        }
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let record = SearchRecord::new("", "Home", "Home", "é".repeat(300), Category::Page);
        let text = snippet(&record);
        assert!(text.ends_with("..."));
        assert_eq!(text.chars().count(), SNIPPET_CHARS + 3);
    }
}
