//! Default handler registry
//!
//! One table entry per event kind, in a fixed order. Handlers are plain
//! field copies into [`crate::model`] state or one of the two caches;
//! adding an event kind means adding one entry here, never touching the
//! router.

use serde_json::Value;

use crate::model::Candle;
use crate::parser::{BalanceChanged, CandleUpdate, TradersMoodUpdate};
use crate::router::HandlerRegistration;

/// Build the default registration table.
///
/// Invocation order equals the order of this list and is part of the
/// contract: handlers reacting to structurally overlapping payloads rely
/// on running in a fixed sequence.
pub fn default_registry() -> Vec<HandlerRegistration> {
    vec![
        HandlerRegistration::probe("technical-indicators", true, |ctx, env| {
            // Arrives both tagged and untagged depending on feed version,
            // so probe the payload for its identifying key.
            if !env.is("technical-indicators") && env.msg.get("indicator").is_none() {
                return;
            }
            let Some(id) = env.msg.get("indicator").and_then(Value::as_str) else {
                return;
            };
            let mut indicators = ctx.indicators.write();
            indicators.insert(id.to_string(), env.msg.clone());
            indicators.prune(ctx.prune_ceiling);
        }),
        HandlerRegistration::on("timeSync", false, |ctx, env| {
            if let Some(ms) = env.msg.as_i64() {
                ctx.market.write().server_time_ms = Some(ms);
            }
        }),
        HandlerRegistration::on("heartbeat", false, |ctx, env| {
            if let Some(ms) = env.msg.as_i64() {
                let mut market = ctx.market.write();
                market.last_heartbeat_ms = Some(ms);
                market.last_heartbeat_at = Some(chrono::Utc::now());
            }
        }),
        HandlerRegistration::on("balances", false, |ctx, env| {
            ctx.account.write().balances = Some(env.msg.clone());
        }),
        HandlerRegistration::on("profile", false, |ctx, env| {
            ctx.account.write().profile = Some(env.msg.clone());
        }),
        HandlerRegistration::on("balance-changed", false, |ctx, env| {
            if let Ok(changed) = serde_json::from_value::<BalanceChanged>(env.msg.clone()) {
                ctx.account.write().active_balance = Some(changed.current_balance);
            }
        }),
        HandlerRegistration::on("candles", false, |ctx, env| {
            if let Some(candles) = env.msg.get("candles") {
                ctx.market.write().candle_history = Some(candles.clone());
            }
        }),
        HandlerRegistration::on("candle-generated", true, |ctx, env| {
            let Ok(update) = serde_json::from_value::<CandleUpdate>(env.msg.clone()) else {
                return;
            };
            let candle = Candle {
                open: update.open,
                close: update.close,
                min: update.min,
                max: update.max,
                volume: update.volume,
                to: update.to,
            };
            ctx.candle_series.write().put(
                update.active_id,
                update.size,
                update.from,
                candle,
                ctx.candle_series_depth,
            );
        }),
        HandlerRegistration::on("instrument-quotes-generated", false, |ctx, env| {
            ctx.market.write().instrument_quotes = Some(env.msg.clone());
        }),
        HandlerRegistration::on("commission-changed", false, |ctx, env| {
            if let Some(instrument) = env.msg.get("instrument_type").and_then(Value::as_str) {
                ctx.market
                    .write()
                    .commissions
                    .insert(instrument.to_string(), env.msg.clone());
            }
        }),
        HandlerRegistration::on("traders-mood-changed", false, |ctx, env| {
            if let Ok(mood) = serde_json::from_value::<TradersMoodUpdate>(env.msg.clone()) {
                ctx.market.write().traders_mood.insert(mood.asset_id, mood.value);
            }
        }),
        HandlerRegistration::on("position-changed", false, |ctx, env| {
            if let Some(id) = env.msg.get("id").and_then(Value::as_u64) {
                ctx.account.write().positions.insert(id, env.msg.clone());
            }
        }),
        HandlerRegistration::on("order-changed", false, |ctx, env| {
            if let Some(id) = env.msg.get("id").and_then(Value::as_u64) {
                ctx.account.write().orders.insert(id, env.msg.clone());
            }
        }),
        HandlerRegistration::on("digital-option-placed", true, |ctx, env| {
            let Some(id) = env.msg.get("id").and_then(Value::as_u64) else {
                return;
            };
            let mut options = ctx.digital_options.write();
            options.insert(id, env.msg.clone());
            options.prune(ctx.prune_ceiling);
        }),
        HandlerRegistration::on("live-deal", false, |ctx, env| {
            ctx.market.write().last_live_deal = Some(env.msg.clone());
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::router::EventRouter;
    use crate::FeedContext;
    use rust_decimal_macros::dec;

    fn dispatch(ctx: &FeedContext, frames: &[&str]) {
        let router = EventRouter::new(default_registry());
        for frame in frames {
            router.dispatch(ctx, frame);
        }
    }

    #[test]
    fn test_time_sync_and_heartbeat() {
        let ctx = FeedContext::new(&Config::default());
        dispatch(
            &ctx,
            &[
                r#"{"name":"timeSync","msg":1672531200000}"#,
                r#"{"name":"heartbeat","msg":1672531201000}"#,
            ],
        );
        let market = ctx.market.read();
        assert_eq!(market.server_time_ms, Some(1672531200000));
        assert_eq!(market.last_heartbeat_ms, Some(1672531201000));
    }

    #[test]
    fn test_candle_update_lands_in_series_cache() {
        let ctx = FeedContext::new(&Config::default());
        dispatch(
            &ctx,
            &[r#"{"name":"candle-generated","msg":{
                "active_id":1,"size":60,"from":1672531200,"to":1672531260,
                "open":1.0653,"close":1.0655,"min":1.0651,"max":1.0657,"volume":125.0
            }}"#],
        );
        let series = ctx.candle_series.read();
        let candle = series.get(1, 60, 1672531200).expect("candle stored");
        assert_eq!(candle.close, dec!(1.0655));
        assert_eq!(candle.to, 1672531260);
    }

    #[test]
    fn test_candle_series_stays_bounded() {
        let mut config = Config::default();
        config.candle_series_depth = 4;
        let ctx = FeedContext::new(&config);
        let router = EventRouter::new(default_registry());
        for i in 0..50 {
            let frame = format!(
                r#"{{"name":"candle-generated","msg":{{
                    "active_id":1,"size":60,"from":{},"to":{},
                    "open":1.0,"close":1.1,"min":0.9,"max":1.2,"volume":1.0
                }}}}"#,
                1672531200 + i * 60,
                1672531260 + i * 60,
            );
            router.dispatch(&ctx, &frame);
        }
        assert_eq!(ctx.candle_series.read().bucket_len(1, 60), 4);
    }

    #[test]
    fn test_digital_option_lands_in_pruning_map() {
        let ctx = FeedContext::new(&Config::default());
        dispatch(
            &ctx,
            &[r#"{"name":"digital-option-placed","msg":{"id":42,"amount":10.0}}"#],
        );
        let options = ctx.digital_options.read();
        assert!(options.contains_key(&42));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_untagged_indicator_is_probed() {
        let ctx = FeedContext::new(&Config::default());
        dispatch(&ctx, &[r#"{"indicator":"rsi","value":61.8}"#]);
        assert!(ctx.indicators.read().contains_key(&"rsi".to_string()));
    }

    #[test]
    fn test_account_field_copies() {
        let ctx = FeedContext::new(&Config::default());
        dispatch(
            &ctx,
            &[
                r#"{"name":"profile","msg":{"user_id":7,"currency":"USD"}}"#,
                r#"{"name":"balance-changed","msg":{"current_balance":{"id":3,"amount":100.0}}}"#,
                r#"{"name":"position-changed","msg":{"id":9001,"status":"open"}}"#,
                r#"{"name":"order-changed","msg":{"id":555,"status":"filled"}}"#,
            ],
        );
        let account = ctx.account.read();
        assert!(account.profile.is_some());
        assert_eq!(
            account
                .active_balance
                .as_ref()
                .and_then(|b| b.get("id"))
                .and_then(serde_json::Value::as_u64),
            Some(3)
        );
        assert!(account.positions.contains_key(&9001));
        assert!(account.orders.contains_key(&555));
    }

    #[test]
    fn test_unknown_event_is_a_noop() {
        let ctx = FeedContext::new(&Config::default());
        dispatch(&ctx, &[r#"{"name":"front-changed","msg":{"x":1}}"#]);
        assert!(ctx.market.read().server_time_ms.is_none());
        assert!(ctx.account.read().profile.is_none());
        assert!(ctx.indicators.read().is_empty());
    }
}
