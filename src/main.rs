//! # devtree-sync CLI
//!
//! Binary entry point for the `devtree-sync` command-line tool. It parses
//! arguments with `clap` and hands off to [`cli::Cli::execute`]. All sync
//! logic lives in the library crate.
//!
//! A fatal error is printed to stderr and the process exits with status 1.
//! Usage errors exit with status 2 (handled by clap).

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
