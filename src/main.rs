//! loraprep CLI entrypoint.
//!
//! Thin wrapper over the `cli` module: parse args, run one batch on the
//! background worker, and exit with an error status if the run was fatal.
//! For programmatic use, prefer the library API (`loraprep::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
