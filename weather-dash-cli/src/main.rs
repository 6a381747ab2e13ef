//! Binary crate for the `weather-dash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive prompts (configuration, capital picker, search with suggestions)
//! - Printing rendered dashboards and notices

use clap::Parser;

mod cli;
mod logging;
mod prompt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cmd = cli::Cli::parse();
    cmd.run().await
}
