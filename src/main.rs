//! Streaming trading-feed client
//!
//! Maintains one WebSocket connection to the trading platform, routes every
//! inbound event through the handler registry, and keeps the shared caches
//! bounded. Reconnection policy stays here, at the edge, not in the session.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quotefeed::registry::default_registry;
use quotefeed::{Config, ConnectionSession, EventRouter, FeedContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting quotefeed client");

    // Load configuration
    let config = Config::load()?;
    info!(endpoint = %config.ws_endpoint, "Configuration loaded");

    let ctx = Arc::new(FeedContext::new(&config));
    let router = EventRouter::new(default_registry());
    info!(
        handlers = router.len(),
        cache_backed = router.cache_backed_count(),
        "Handler registry built"
    );

    let mut session = ConnectionSession::new(&config.ws_endpoint, Arc::clone(&ctx), router);
    session.open()?;

    // Periodic status logging
    let status = session.state();
    let log_interval = Duration::from_secs(config.status_log_interval_secs);
    let status_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(log_interval);
        loop {
            interval.tick().await;
            let snap = status.snapshot();
            info!(
                status = ?snap.status,
                last_error = snap.last_error.as_deref().unwrap_or(""),
                dispatch_in_flight = snap.dispatch_in_flight,
                "Session status"
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    status_task.abort();
    session.close().await;
    info!(status = ?session.state().status(), "Session closed");

    Ok(())
}
