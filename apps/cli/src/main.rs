//! debrisscan CLI — resolve anonymized debris entries on a game map.
//!
//! Crawls the fleets visible around a debris field and matches their
//! computed salvage values against the "Unknown" rows the host publishes.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
