//! lipidscrape CLI — lipid catalog extraction.
//!
//! Crawls the MAD database and the CHARMM-GUI small-molecule archive and
//! writes one normalized CSV per source.

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
