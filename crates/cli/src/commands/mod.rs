//! Subcommands and the plumbing they share.

use clap::{Args, ValueEnum};
use console::style;
use std::path::PathBuf;

use docindex_core::{Category, DocIndex, Settings};

pub mod convert;
pub mod lookup;
pub mod mcp;
pub mod pages;
pub mod search;
pub mod stats;
pub mod validate;

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to $DOCINDEX_CONFIG, ./docindex.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Search index file (defaults to the configured `index` or the usual build locations)
    #[arg(long, global = true, value_name = "FILE")]
    pub index: Option<PathBuf>,
}

/// Record category as a command-line value.
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum CategoryArg {
    /// Headings
    Section,
    /// Page titles and paragraphs
    Page,
    /// Docstrings
    Method,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Section => Category::Section,
            CategoryArg::Page => Category::Page,
            CategoryArg::Method => Category::Method,
        }
    }
}

/// Resolved settings and index location for one invocation.
#[derive(Debug, Clone)]
pub struct Session {
    /// Effective settings.
    pub settings: Settings,
    /// Index file to operate on.
    pub index_path: PathBuf,
}

impl Session {
    /// Load the config and pick the index file.
    pub fn open(global: &GlobalArgs) -> Result<Self, String> {
        let (settings, source) =
            Settings::load(global.config.as_deref()).map_err(|e| e.to_string())?;
        if let Some(source) = source {
            tracing::debug!("Using config {}", source.display());
        }
        let cwd = std::env::current_dir()
            .map_err(|e| format!("Failed to determine working directory: {e}"))?;
        let index_path = settings
            .resolve_index_path(&cwd, global.index.as_deref())
            .map_err(|e| e.to_string())?;
        Ok(Self {
            settings,
            index_path,
        })
    }

    /// Parse and index the file with the configured parse mode.
    pub fn load_index(&self) -> Result<DocIndex, String> {
        DocIndex::load(&self.index_path, self.settings.parse_mode()).map_err(|e| e.to_string())
    }
}

/// Turn a command result into an exit code, printing the error.
pub fn finish(result: Result<(), String>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            1
        }
    }
}

/// `text` cut to `max` characters, with an ellipsis when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}…")
}

/// One line per record for terminal listings.
pub fn print_record(record: &docindex_core::SearchRecord) {
    println!(
        "{} {} {}",
        style(format!("[{}]", record.category)).cyan(),
        style(&record.title).bold(),
        style(format!("({})", record.page)).dim()
    );
    println!("    {}", record.location);
    if !record.text.trim().is_empty() {
        println!("    {}", truncate(&record.text.replace('\n', " "), 160));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("  short  ", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_category_arg_maps_to_category() {
        assert_eq!(Category::from(CategoryArg::Method), Category::Method);
        assert_eq!(Category::from(CategoryArg::Page), Category::Page);
    }

    #[test]
    fn test_finish_exit_codes() {
        assert_eq!(finish(Ok(())), 0);
        assert_eq!(finish(Err("boom".to_string())), 1);
    }
}
