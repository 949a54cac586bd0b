//! Tracing setup shared by the binaries.
//!
//! `DOCINDEX_LOG` controls the level: a plain level such as `debug` applies to
//! the docindex crates only, anything else is used as a full filter spec
//! (e.g. `docindex_core=trace,docindex_mcp=debug`). Output goes to stderr so
//! stdout stays free for command output and the MCP transport.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log level or filter spec.
pub const LOG_ENV: &str = "DOCINDEX_LOG";

/// Crates a plain level applies to.
const CRATES: &[&str] = &[
    "docindex",
    "docindex_cli",
    "docindex_core",
    "docindex_mcp",
    "docindex_common",
];

/// Install the global subscriber; `default_level` applies when
/// `DOCINDEX_LOG` is unset.
pub fn init_tracing(default_level: &str) {
    let filter = filter_spec(std::env::var(LOG_ENV).ok().as_deref(), default_level);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// Build the filter spec from the environment value.
pub fn filter_spec(env_value: Option<&str>, default_level: &str) -> String {
    match env_value {
        Some(level) if is_plain_level(level) => scoped(&level.to_ascii_lowercase()),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => scoped(default_level),
    }
}

fn scoped(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}
