use std::{sync::Arc, time::Duration};

use blockcast_decode::Decoder;
use blockcast_forecast::{ForecastConfig, ForecastManager};
use blockcast_mempool::{AnnotationCache, MempoolManager, MempoolState};
use blockcast_node::NodeManager;
use blockcast_registry::{ContractRegistry, RegistryConfig};
use blockcast_storage::MemoryStore;
use blockcast_utils::{shutdown_channel, RateLimiter};
use clap::Parser;
use tracing::info;
use url::Url;

#[derive(Parser)]
#[clap(about = "Mempool observer that forecasts and scores next-block contents")]
struct Cli {
    /// websocket endpoint of the execution node
    #[clap(long, env = "ETH_WS_URL")]
    eth_ws_url: Url,

    /// api key for the Etherscan-style contract resolver. contract lookups
    /// fall back to Sourcify alone without it
    #[clap(long, env = "ETHERSCAN_API_KEY")]
    etherscan_api_key: Option<String>,

    /// maximum concurrent in-flight rpc calls
    #[clap(long, default_value_t = 50)]
    max_in_flight: usize,

    /// seconds between timer-driven forecasts
    #[clap(long, default_value_t = 3)]
    forecast_interval_secs: u64,

    /// disable sourcify/etherscan/4byte lookups entirely
    #[clap(long)]
    offline: bool
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let (shutdown, signal) = shutdown_channel();

    let store = Arc::new(MemoryStore::default());
    let registry = Arc::new(ContractRegistry::new(
        store.clone(),
        RegistryConfig {
            etherscan_api_key: cli.etherscan_api_key,
            external_lookups:  !cli.offline
        }
    ));

    let node = NodeManager::spawn(cli.eth_ws_url, signal.clone());
    let limiter = RateLimiter::new(cli.max_in_flight);
    let decoder = Arc::new(Decoder::new(node.clone(), registry, limiter.clone()));

    let mempool = MempoolState::new();
    let cache = AnnotationCache::default();

    let mempool_task = MempoolManager::spawn(
        node.subscribe_events(),
        mempool.clone(),
        cache.clone(),
        decoder.clone(),
        node.clone(),
        limiter,
        signal.clone()
    );

    let forecast_task = ForecastManager::spawn(
        node.subscribe_events(),
        node.clone(),
        mempool,
        cache,
        decoder,
        store,
        ForecastConfig {
            interval: Duration::from_secs(cli.forecast_interval_secs),
            ..Default::default()
        },
        signal
    );

    info!("blockcast running, ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    info!("shutting down");
    shutdown.shutdown();
    let _ = tokio::join!(mempool_task, forecast_task);

    Ok(())
}
