//! `docindex pages`

use console::style;

use super::{GlobalArgs, Session, finish};

/// List pages in first-appearance order.
pub fn run(global: &GlobalArgs) -> i32 {
    finish(run_inner(global))
}

fn run_inner(global: &GlobalArgs) -> Result<(), String> {
    let index = Session::open(global)?.load_index()?;

    for page in index.pages() {
        let path = if page.path.is_empty() { "/" } else { page.path.as_str() };
        println!(
            "{} {} {}",
            style(&page.page).bold(),
            style(path).dim(),
            style(format!(
                "{} records: {} sections, {} methods, {} paragraphs",
                page.records, page.sections, page.methods, page.paragraphs
            ))
            .dim()
        );
    }
    Ok(())
}
