//! `docindex validate`

use clap::Args;
use console::style;

use docindex_core::codec::{self, ParseMode};
use docindex_core::validate::{Severity, validate};

use super::{GlobalArgs, Session, finish};

/// Arguments of `validate`.
#[derive(Args, Debug, Clone, Copy)]
pub struct ValidateArgs {
    /// Fail on the first malformed record instead of reporting and skipping it
    #[arg(long)]
    pub strict: bool,
}

/// Run the command; exits 1 when the index is not conformant.
pub fn run(global: &GlobalArgs, args: &ValidateArgs) -> i32 {
    finish(run_inner(global, args))
}

fn run_inner(global: &GlobalArgs, args: &ValidateArgs) -> Result<(), String> {
    let session = Session::open(global)?;
    let mode = if args.strict {
        ParseMode::Strict
    } else {
        session.settings.parse_mode()
    };

    let outcome = codec::read_file(&session.index_path, mode).map_err(|e| e.to_string())?;
    let report = validate(&outcome.index.records).at_source_positions(&outcome.positions);

    for dropped in &outcome.dropped {
        println!(
            "{} record {}: {}",
            style("error").red().bold(),
            dropped.position,
            dropped.reason
        );
    }
    for issue in &report.issues {
        let label = match issue.severity() {
            Severity::Error => style("error").red().bold(),
            Severity::Warning => style("warning").yellow().bold(),
        };
        println!("{label} {issue}");
    }

    let errors = report.errors().count() + outcome.dropped.len();
    let warnings = report.warnings().count();
    let summary = format!(
        "{}: {} records, {errors} errors, {warnings} warnings",
        session.index_path.display(),
        report.records
    );

    if errors == 0 {
        println!("{} {summary}", style("✓").green().bold());
        Ok(())
    } else {
        Err(format!("{summary}; index is not conformant"))
    }
}
