//! Bounded in-memory caches for streaming state
//!
//! Two eviction disciplines cover everything the feed handlers accumulate:
//! a per-bucket bound with smallest-key eviction for time-series data
//! ([`SeriesCache`]) and a global ceiling with oldest-inserted eviction for
//! flat keyed records ([`PruningMap`]).

mod pruning;
mod series;

pub use pruning::PruningMap;
pub use series::SeriesCache;
