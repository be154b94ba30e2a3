//! depthwatch console monitor — entry point.

use anyhow::Result;
use clap::Parser;
use depthwatch_monitor::{Application, MonitorConfig};
use tracing::info;

/// Live market-depth monitor: surfaces order-book levels whose notional
/// value crosses configured thresholds.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DEPTHWATCH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured trading pair symbol
    #[arg(short, long)]
    symbol: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    depthwatch_ws::init_crypto();

    let args = Args::parse();

    depthwatch_monitor::init_logging();
    info!("Starting depthwatch v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("DEPTHWATCH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let mut config = MonitorConfig::load(&config_path)?;
    if let Some(symbol) = args.symbol {
        config.symbol = symbol;
    }
    info!(
        symbol = %config.symbol,
        ask_threshold = %config.ask_threshold,
        bid_threshold = %config.bid_threshold,
        "Configuration loaded"
    );

    let app = Application::new(config);
    app.run().await?;

    Ok(())
}
