//! Command-line interface for docindex.
//!
//! Every command resolves the configuration and the index file the same way
//! (see [`commands::Session`]), does its work synchronously, and reports an
//! exit code. `mcp` hands the loaded index to the MCP server and runs until
//! the client disconnects.

use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;

use commands::GlobalArgs;

#[derive(Parser, Debug)]
#[command(
    name = "docindex",
    version,
    about = "Validate, query and convert documentation search indexes 🔎"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// ✅ Check an index against the format rules
    Validate(commands::validate::ValidateArgs),
    /// 📍 Show the records at a location
    Lookup(commands::lookup::LookupArgs),
    /// 🔎 Full-text search
    Search(commands::search::SearchArgs),
    /// 📚 List pages
    Pages,
    /// 📊 Record counts and content digest
    Stats(commands::stats::StatsArgs),
    /// 🔁 Rewrite the index as JS or JSON
    Convert(commands::convert::ConvertArgs),
    /// 🔌 Start the MCP server on stdio
    Mcp,
}

/// Run the CLI with `args` (including the program name) and return the exit
/// code.
pub fn run_cli(args: Vec<String>) -> i32 {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run_cli_async(args))
}

/// [`run_cli`] inside an existing runtime.
pub async fn run_cli_async(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Validate(args)) => commands::validate::run(&cli.global, &args),
            Some(Commands::Lookup(args)) => commands::lookup::run(&cli.global, &args),
            Some(Commands::Search(args)) => commands::search::run(&cli.global, &args),
            Some(Commands::Pages) => commands::pages::run(&cli.global),
            Some(Commands::Stats(args)) => commands::stats::run(&cli.global, &args),
            Some(Commands::Convert(args)) => commands::convert::run(&cli.global, &args),
            Some(Commands::Mcp) => commands::mcp::run(&cli.global).await,
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}
