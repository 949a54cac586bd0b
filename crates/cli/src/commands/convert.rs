//! `docindex convert`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use docindex_core::codec::{self, OutputFormat};

use super::{GlobalArgs, Session, finish};

/// Output layout.
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum Target {
    /// `var <name> = {"docs": [...]}`
    Js,
    /// `{"docs": [...]}`
    Json,
}

/// Arguments of `convert`.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Output layout
    #[arg(long, value_enum)]
    pub to: Target,
    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,
    /// Variable name for JS output (default from config)
    #[arg(long)]
    pub var_name: Option<String>,
    /// Destination file, replaced atomically
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: PathBuf,
}

/// Rewrite the index in another layout.
pub fn run(global: &GlobalArgs, args: &ConvertArgs) -> i32 {
    finish(run_inner(global, args))
}

fn output_format(args: &ConvertArgs) -> OutputFormat {
    match (args.to, args.pretty) {
        (Target::Js, _) => OutputFormat::Js,
        (Target::Json, false) => OutputFormat::Json,
        (Target::Json, true) => OutputFormat::JsonPretty,
    }
}

fn run_inner(global: &GlobalArgs, args: &ConvertArgs) -> Result<(), String> {
    let session = Session::open(global)?;
    let outcome = codec::read_file(&session.index_path, session.settings.parse_mode())
        .map_err(|e| e.to_string())?;
    if !outcome.dropped.is_empty() {
        tracing::warn!("Dropped {} malformed records", outcome.dropped.len());
    }

    let var_name = args
        .var_name
        .clone()
        .unwrap_or_else(|| session.settings.var_name.clone());
    let index = outcome.index.with_var_name(var_name);

    codec::write_file(&args.output, &index, output_format(args)).map_err(|e| e.to_string())?;
    println!(
        "Wrote {} records to {}",
        index.len(),
        args.output.display()
    );
    Ok(())
}
