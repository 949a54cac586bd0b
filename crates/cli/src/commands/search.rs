//! `docindex search`

use clap::Args;
use console::style;

use docindex_core::{Category, Combine, SearchMode};

use super::{CategoryArg, GlobalArgs, Session, finish, truncate};

/// Arguments of `search`.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Query text
    pub query: String,
    /// Maximum number of results, 0 for all (default from config)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
    /// Restrict to these categories (repeatable)
    #[arg(long, value_enum)]
    pub category: Vec<CategoryArg>,
    /// Match the whole query as a case-insensitive substring
    #[arg(long)]
    pub substring: bool,
    /// Match records containing any term instead of all terms
    #[arg(long)]
    pub any: bool,
    /// Only match whole tokens
    #[arg(long)]
    pub no_prefix: bool,
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print ranked results.
pub fn run(global: &GlobalArgs, args: &SearchArgs) -> i32 {
    finish(run_inner(global, args))
}

fn run_inner(global: &GlobalArgs, args: &SearchArgs) -> Result<(), String> {
    let session = Session::open(global)?;
    let index = session.load_index()?;

    let mut options = session.settings.search_options();
    if let Some(limit) = args.limit {
        options.limit = limit;
    }
    options.categories = args.category.iter().copied().map(Category::from).collect();
    if args.substring {
        options.mode = SearchMode::Substring;
    }
    if args.any {
        options.combine = Combine::Any;
    }
    if args.no_prefix {
        options.prefix = false;
    }

    let hits = index.search(&args.query, &options);

    if args.json {
        let json = serde_json::to_string_pretty(&hits)
            .map_err(|e| format!("Failed to serialize results: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results for '{}'", args.query);
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>3}. {} {} {}",
            rank + 1,
            style(&hit.record.title).bold(),
            style(format!("[{}]", hit.record.category)).cyan(),
            style(format!("{:.3}", hit.score)).dim()
        );
        println!("     {}", hit.record.location);
        if !hit.record.text.trim().is_empty() {
            println!("     {}", truncate(&hit.record.text.replace('\n', " "), 120));
        }
    }
    Ok(())
}
