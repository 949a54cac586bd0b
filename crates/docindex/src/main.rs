//! `docindex` binary.

use docindex_core::logging::init_tracing;

fn main() {
    init_tracing("info");
    let code = docindex_cli::run_cli(std::env::args().collect());
    std::process::exit(code);
}
