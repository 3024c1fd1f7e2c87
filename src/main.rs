#![forbid(unsafe_code)]

//! sweep: find and delete regenerable build and dependency artifacts.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("sweep: {e}");
        std::process::exit(e.exit_code());
    }
}
