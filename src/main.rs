use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use promchart::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    // Logs go to stderr so charts on stdout stay clean
    init_tracing();

    commands::graph::execute(args).await
}
