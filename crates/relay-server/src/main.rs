mod cli;
mod observability;

use std::sync::Arc;

use clap::Parser;

use relay_api::{build_router, AppState};
use relay_config::RelayConfig;
use relay_delivery::DeliveryClient;
use relay_scheduler::Scheduler;
use relay_storage_memory::{
    MemoryAuditStorage, MemoryChannelStorage, MemoryScheduledWorkStorage, MemorySubscriptionStorage,
};

use cli::Cli;
use observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Cli::parse();
    let mut config = RelayConfig::load()?;
    if let Some(bind_address) = args.bind_address {
        config.bind_address = bind_address;
    }

    let channels: Arc<dyn relay_storage::ChannelStorage> = Arc::new(MemoryChannelStorage::new());
    let subscriptions: Arc<dyn relay_storage::SubscriptionStorage> = Arc::new(MemorySubscriptionStorage::new());
    let audit: Arc<dyn relay_storage::AuditStorage> = Arc::new(MemoryAuditStorage::new());
    let work: Arc<dyn relay_storage::ScheduledWorkStorage> = Arc::new(MemoryScheduledWorkStorage::new());

    // Shared with AppState below so an API-triggered eviction (subscriber
    // deletion) actually reaches the cache the scheduler reads from.
    let token_cache = Arc::new(relay_delivery::TokenCache::new());

    let delivery = Arc::new(DeliveryClient::new(
        config.request_timeout_connect(),
        config.request_timeout_read(),
        &config.extra_ca_bundle_paths,
        token_cache.clone(),
    )?);

    let scheduler = Arc::new(Scheduler::new(
        channels.clone(),
        subscriptions.clone(),
        audit.clone(),
        work.clone(),
        delivery.clone(),
        config.clone(),
    ));
    tokio::spawn(scheduler.run());

    let state = AppState::new(channels, subscriptions, audit, work, Arc::new(config.clone()))
        .with_delivery(delivery, token_cache);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracing();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
