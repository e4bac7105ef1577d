//! In-memory TTL cache for API responses
//!
//! This module provides a `TtlCache` that holds raw response bodies keyed by
//! request URL. Entries age out after a fixed interval and a background sweep
//! task removes them, so the cache never grows past the set of URLs requested
//! within one interval.

mod stats;
mod store;
mod sweep;

pub(crate) use stats::CacheStats;
pub use stats::StatsSnapshot;
pub use store::{CacheError, TtlCache, DEFAULT_INTERVAL};
