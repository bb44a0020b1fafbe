//! Configuration module for the feed client

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket endpoint of the trading-platform streaming API
    pub ws_endpoint: String,

    /// Maximum candles retained per (asset, timeframe) series bucket
    pub candle_series_depth: usize,

    /// Entry ceiling for the flat accumulating caches
    pub prune_ceiling: usize,

    /// Status logging interval in seconds
    pub status_log_interval_secs: u64,
}

/// Default ceiling for flat accumulating caches
pub const DEFAULT_PRUNE_CEILING: usize = 5000;

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            ws_endpoint: env::var("WS_ENDPOINT")
                .unwrap_or_else(|_| "wss://ws.trade-platform.example/echo/websocket".to_string()),
            candle_series_depth: env::var("CANDLE_SERIES_DEPTH")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            prune_ceiling: env::var("PRUNE_CEILING")
                .unwrap_or_else(|_| DEFAULT_PRUNE_CEILING.to_string())
                .parse()
                .unwrap_or(DEFAULT_PRUNE_CEILING),
            status_log_interval_secs: env::var("STATUS_LOG_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ws_endpoint: "wss://ws.trade-platform.example/echo/websocket".to_string(),
            candle_series_depth: 300,
            prune_ceiling: DEFAULT_PRUNE_CEILING,
            status_log_interval_secs: 30,
        }
    }
}
