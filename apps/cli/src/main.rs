//! lessonmap CLI: scan a curriculum tree into CSV/JSON/YAML catalogs.
//!
//! Walks lesson markdown and `_CONFIG.json` sidecars, builds one record per
//! lesson, writes the full collection plus per-level subsets, and pushes the
//! collection to the ingestion endpoint.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
