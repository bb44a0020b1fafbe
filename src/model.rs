//! Shared state written by feed handlers
//!
//! These are the field-copy targets: the receive task writes them, everything
//! else reads the latest values. No algorithmic content lives here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One stored candle, keyed in the series cache by its time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: Decimal,
    pub close: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub volume: Decimal,
    /// End of the time bucket (epoch seconds)
    pub to: i64,
}

/// Latest market-wide values streamed by the platform
#[derive(Debug, Default)]
pub struct MarketState {
    /// Server clock from timeSync events (epoch milliseconds)
    pub server_time_ms: Option<i64>,
    /// Last heartbeat payload (epoch milliseconds)
    pub last_heartbeat_ms: Option<i64>,
    /// Local receipt time of the last heartbeat, for staleness checks
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    /// Candle history returned for an explicit candles request
    pub candle_history: Option<Value>,
    /// Latest quotes payload per instrument feed
    pub instrument_quotes: Option<Value>,
    /// Sentiment per asset id
    pub traders_mood: HashMap<u32, f64>,
    /// Commission payloads per instrument type
    pub commissions: HashMap<String, Value>,
    /// Most recent live deal seen on the public feed
    pub last_live_deal: Option<Value>,
}

/// Latest account-scoped values streamed by the platform
#[derive(Debug, Default)]
pub struct AccountState {
    /// Raw profile payload
    pub profile: Option<Value>,
    /// Raw balances list
    pub balances: Option<Value>,
    /// Currently selected balance, from balance-changed events
    pub active_balance: Option<Value>,
    /// Open/changed positions keyed by position id
    pub positions: HashMap<u64, Value>,
    /// Order lifecycle payloads keyed by order id
    pub orders: HashMap<u64, Value>,
}
