//! Parser module for streaming-platform WebSocket messages
//!
//! The wire format is loosely tagged: every frame is a JSON object that
//! usually carries a `name` and a `msg` payload, but no field is guaranteed.
//! Only the payloads the default handlers copy into typed state get structs
//! here; everything else stays as `serde_json::Value`.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// A single decoded inbound message.
///
/// `name` is the loose event tag when present. `msg` is the payload; for
/// frames without a `msg` field the whole object is kept so handlers can
/// probe it for the keys they expect.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub name: Option<String>,
    pub msg: Value,
}

impl Envelope {
    /// Decode a raw text frame.
    ///
    /// Returns `None` for malformed JSON: partial frames are expected
    /// during reconnects and are dropped without surfacing an error.
    pub fn parse(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let msg = match value.get("msg") {
            Some(msg) => msg.clone(),
            None => value,
        };
        Some(Self { name, msg })
    }

    /// Check whether this envelope carries the given event tag
    pub fn is(&self, kind: &str) -> bool {
        self.name.as_deref() == Some(kind)
    }
}

/// Real-time candle update payload
#[derive(Debug, Clone, Deserialize)]
pub struct CandleUpdate {
    pub active_id: u32,
    /// Timeframe in seconds
    pub size: u32,
    /// Start of the time bucket (epoch seconds)
    pub from: i64,
    pub to: i64,
    pub open: Decimal,
    pub close: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    #[serde(default)]
    pub volume: Decimal,
}

/// Traders-mood update payload
#[derive(Debug, Clone, Deserialize)]
pub struct TradersMoodUpdate {
    pub asset_id: u32,
    pub value: f64,
}

/// Active-balance change payload
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceChanged {
    pub current_balance: Value,
}
