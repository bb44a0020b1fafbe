//! Streaming trading-feed client library
//!
//! This crate maintains one WebSocket connection to a trading-platform
//! streaming endpoint, routes each inbound JSON event through a fixed
//! handler registry, and keeps the resulting shared state bounded under
//! sustained feed pressure.

use parking_lot::RwLock;
use serde_json::Value;

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod registry;
pub mod router;
pub mod session;
pub mod state;

pub use cache::{PruningMap, SeriesCache};
pub use config::Config;
pub use error::{FeedError, Result};
pub use model::{AccountState, Candle, MarketState};
pub use parser::Envelope;
pub use router::{EventRouter, HandlerRegistration};
pub use session::ConnectionSession;
pub use state::{CloseInfo, ConnectionStatus, SessionState, StatusSnapshot};

/// Shared context handed to every handler invocation.
///
/// Written only by the session's receive task; read from any thread through
/// the per-structure locks. Handlers hold a write lock for the duration of
/// one mutation, so readers never observe partially-updated records.
pub struct FeedContext {
    /// Maximum candles retained per (asset, timeframe) series bucket
    pub candle_series_depth: usize,
    /// Ceiling for the flat accumulating caches
    pub prune_ceiling: usize,

    pub market: RwLock<MarketState>,
    pub account: RwLock<AccountState>,
    pub candle_series: RwLock<SeriesCache<Candle>>,
    pub indicators: RwLock<PruningMap<String, Value>>,
    pub digital_options: RwLock<PruningMap<u64, Value>>,
}

impl FeedContext {
    /// Create an empty context with the configured cache limits
    pub fn new(config: &Config) -> Self {
        Self {
            candle_series_depth: config.candle_series_depth,
            prune_ceiling: config.prune_ceiling,
            market: RwLock::new(MarketState::default()),
            account: RwLock::new(AccountState::default()),
            candle_series: RwLock::new(SeriesCache::new()),
            indicators: RwLock::new(PruningMap::new()),
            digital_options: RwLock::new(PruningMap::new()),
        }
    }
}
