//! Broker runtime entry point.

use anyhow::Result;
use broker_runtime::{BrokerRuntime, RuntimeConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = RuntimeConfig::from_env();

    // Wire and start every service
    let runtime = BrokerRuntime::start(config)?;

    info!("Broker is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    runtime.shutdown();

    Ok(())
}
