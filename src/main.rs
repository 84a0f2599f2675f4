//! # dcm
//!
//! Binary entry point for the `dcm` command-line tool. Arguments are parsed
//! with `clap` and dispatched to the commands in [`commands`]; all real work
//! happens in the `dcm` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
