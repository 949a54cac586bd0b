//! `docindex stats`

use clap::Args;

use super::{GlobalArgs, Session, finish};

/// Arguments of `stats`.
#[derive(Args, Debug, Clone, Copy)]
pub struct StatsArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print record counts and the content digest.
pub fn run(global: &GlobalArgs, args: &StatsArgs) -> i32 {
    finish(run_inner(global, args))
}

fn run_inner(global: &GlobalArgs, args: &StatsArgs) -> Result<(), String> {
    let session = Session::open(global)?;
    let stats = session.load_index()?.stats().map_err(|e| e.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&stats)
            .map_err(|e| format!("Failed to serialize stats: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!("file        {}", session.index_path.display());
    println!("variable    {}", stats.var_name);
    println!("records     {}", stats.records);
    println!("pages       {}", stats.pages);
    println!("sections    {}", stats.sections);
    println!("methods     {}", stats.methods);
    println!("paragraphs  {}", stats.paragraphs);
    println!("headers     {}", stats.headers);
    println!("tokens      {}", stats.tokens);
    println!("sha256      {}", stats.digest);
    Ok(())
}
