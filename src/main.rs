//! Skimmer daemon
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - SKIMMER_CONFIG: path to the YAML configuration file (default: config.yaml)
//! - RUST_LOG: log level (default: info)

use std::sync::Arc;

use skimmer::agent::SyncAgent;
use skimmer::config::{ChannelConfig, Config};
use skimmer::metrics::{run_metrics_server, NotifyMetrics};
use skimmer::notify::{build_channels, Dispatcher};
use skimmer::store::HttpStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skimmer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path =
        std::env::var("SKIMMER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&path)?;

    tracing::info!("Skimmer configuration:");
    tracing::info!("  Store: {} (index: {})", config.es_host, config.alerts_index);
    tracing::info!("  Sync interval: {:?}", config.sync_interval);
    tracing::info!("  Metrics: {}", config.metrics_addr);
    for notifier in &config.notifiers {
        let ChannelConfig::Webhook { name, endpoint, retries, .. } = notifier;
        tracing::info!("  Channel: webhook {} -> {} (retries: {})", name, endpoint, retries);
    }

    let metrics = Arc::new(NotifyMetrics::new());
    {
        let metrics = Arc::clone(&metrics);
        let addr = config.metrics_addr.clone();
        tokio::spawn(async move {
            if let Err(e) = run_metrics_server(&addr, metrics).await {
                tracing::error!(error = %e, "Metrics server exited");
            }
        });
    }

    let channels = build_channels(&config.notifiers);
    let dispatcher = Dispatcher::new(channels, Arc::clone(&metrics));
    let store = Arc::new(HttpStore::new(&config));
    let agent = SyncAgent::new(store, dispatcher, config.sync_interval);

    tracing::info!("Skimmer started");
    agent.run().await;

    Ok(())
}
