//! FlowAtlas CLI, the workflow catalog aggregator.
//!
//! Crawls every configured host's workflow API into a single catalog file,
//! then serves it over plain HTTP for the dashboard.

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
