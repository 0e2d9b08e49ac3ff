//! pocbench server binary
//!
//! Binary name: `pocbench`

use anyhow::Context;
use clap::Parser;
use pocbench::{cli::Cli, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve().context("failed to load configuration")?;

    telemetry::init(&config.logging);
    tracing::info!(
        bind = %config.server.bind,
        backend = %config.database.backend,
        "Starting pocbench"
    );

    pocbench::serve(config).await
}
