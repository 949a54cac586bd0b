//! `docindex lookup`

use clap::Args;

use docindex_core::Category;

use super::{CategoryArg, GlobalArgs, Session, finish, print_record};

/// Arguments of `lookup`.
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Exact location, e.g. "apireference/#QuanticsTCI.quanticsfouriermpo-Tuple{Int64}"
    pub location: String,
    /// Only show records of this category
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,
}

/// Print every record at the location; exits 1 when there is none.
pub fn run(global: &GlobalArgs, args: &LookupArgs) -> i32 {
    finish(run_inner(global, args))
}

fn run_inner(global: &GlobalArgs, args: &LookupArgs) -> Result<(), String> {
    let index = Session::open(global)?.load_index()?;
    let wanted = args.category.map(Category::from);

    let records: Vec<_> = index
        .lookup(&args.location)
        .into_iter()
        .filter(|record| wanted.is_none_or(|category| record.category == category))
        .collect();

    if records.is_empty() {
        return Err(format!("No records at location '{}'", args.location));
    }
    for record in records {
        print_record(record);
    }
    Ok(())
}
