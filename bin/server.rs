// Revenue Aggregator - Web Server

use anyhow::Result;
use clap::Parser;
use revenue_aggregator::config::{Config, ServerCli};
use revenue_aggregator::logging;
use revenue_aggregator::server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();
    logging::init_tracing("info");

    let config = Config::from_server_cli(&cli)?;
    let state = AppState::load(config)?;

    serve(state).await
}
