//! # Liquidity Provider
//!
//! Main entry point for the liquidity provider service.

use anyhow::Context;
use ethers::signers::Signer;
use liquidity_provider::config::{LiquidityProviderConfig, LogConfig, LogFormat};
use liquidity_provider::infrastructure::{
    BroadcastEventBus, LocalLiquidityProvider, QuoteEventLogger,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[cfg(feature = "cli")]
#[derive(Debug, clap::Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file, overrides `LPS_CONFIG_FILE`.
    #[arg(short, long)]
    config: Option<String>,
}

fn load_config() -> anyhow::Result<LiquidityProviderConfig> {
    #[cfg(feature = "cli")]
    {
        let args = <Args as clap::Parser>::parse();
        if let Some(path) = args.config {
            let _ = dotenvy::dotenv();
            return LiquidityProviderConfig::from_path(&path)
                .with_context(|| format!("loading {path}"));
        }
    }
    LiquidityProviderConfig::load().context("loading configuration")
}

fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .context("building log filter")?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let init = match log.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    init.map_err(|e| anyhow::anyhow!("initialising tracing: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    config.validate()?;
    init_tracing(&config.log)?;

    info!("Starting liquidity provider v{}", env!("CARGO_PKG_VERSION"));

    if config.signer.private_key.is_empty() {
        anyhow::bail!("signer.private_key is required");
    }
    let signer = LocalLiquidityProvider::signer_from_key(&config.signer.private_key)?;
    info!(
        rsk_address = %format!("{:#x}", signer.address()),
        btc_address = %config.signer.btc_address,
        "LP signer loaded"
    );

    let event_bus = Arc::new(BroadcastEventBus::default());
    let logger = QuoteEventLogger::spawn(event_bus.subscribe());

    info!(
        pegout = ?config.pegout.configuration(),
        pegin = ?config.pegin.configuration(),
        "Liquidity provider started"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down liquidity provider");

    drop(event_bus);
    logger.await?;

    Ok(())
}
