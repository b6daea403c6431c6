//! postforge CLI: blog article enrichment pipeline.
//!
//! Seeds an article store from a blog, then rewrites pending articles with
//! web research and a generative model.

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
