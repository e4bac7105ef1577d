//! TTL cache store
//!
//! A single mutex guards the whole entry map. Lookups, inserts and sweep
//! passes all take it, so a reader never sees a half-written entry and a
//! sweep pass never races an insert.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::trace;

use super::stats::{CacheStats, StatsSnapshot};
use super::sweep::SweepHandle;

/// Default time-to-live for cached responses
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Errors that can occur when constructing a cache
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The TTL interval must be positive
    #[error("cache interval must be greater than zero")]
    InvalidInterval,

    /// The sweep task needs a tokio runtime to run on
    #[error("cache must be created inside a tokio runtime")]
    NoRuntime,
}

/// A cached response body
#[derive(Debug)]
struct CacheEntry {
    /// Raw bytes as stored by `put`
    value: Vec<u8>,
    /// When the entry was inserted; reads never touch it
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// State shared between the cache handle and its sweep task
#[derive(Debug)]
pub(crate) struct Shared {
    entries: Mutex<HashMap<String, CacheEntry>>,
    pub(crate) interval: Duration,
    stats: CacheStats,
}

impl Shared {
    /// Removes every entry older than the interval, returning how many went
    pub(crate) fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.interval));
        let evicted = before - entries.len();
        drop(entries);

        self.stats.record_evictions(evicted);
        evicted
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Time-to-live cache of raw response bodies keyed by URL
///
/// Every entry lives for the same fixed interval. Expired entries are never
/// returned by `get`, and a background task removes them once per interval.
/// Dropping the cache stops the background task.
pub struct TtlCache {
    shared: Arc<Shared>,
    sweeper: Mutex<Option<SweepHandle>>,
}

impl TtlCache {
    /// Creates an empty cache and starts its sweep task on the current runtime
    ///
    /// # Arguments
    /// * `interval` - How long entries stay fresh; also the sweep period
    ///
    /// # Returns
    /// * `Ok(TtlCache)` with the sweep task running
    /// * `Err(CacheError::InvalidInterval)` if `interval` is zero
    /// * `Err(CacheError::NoRuntime)` if called outside a tokio runtime
    pub fn new(interval: Duration) -> Result<Self, CacheError> {
        if interval.is_zero() {
            return Err(CacheError::InvalidInterval);
        }
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let shared = Arc::new(Shared {
            entries: Mutex::new(HashMap::new()),
            interval,
            stats: CacheStats::default(),
        });
        let sweeper = SweepHandle::spawn(&runtime, Arc::clone(&shared));

        Ok(Self {
            shared,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Inserts or replaces the entry for `key`, restarting its TTL
    pub fn put(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let entry = CacheEntry {
            value: value.into(),
            created_at: Instant::now(),
        };

        trace!(key = %key, bytes = entry.value.len(), "cache put");
        self.shared.entries.lock().insert(key, entry);
        self.shared.stats.record_insert();
    }

    /// Returns a copy of the bytes stored for `key` if they are still fresh
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let value = {
            let entries = self.shared.entries.lock();
            entries
                .get(key)
                .filter(|entry| !entry.is_expired(Instant::now(), self.shared.interval))
                .map(|entry| entry.value.clone())
        };

        match value {
            Some(_) => self.shared.stats.record_hit(),
            None => self.shared.stats.record_miss(),
        }
        value
    }

    /// Runs one sweep pass immediately, returning the number of evicted entries
    pub fn sweep_expired(&self) -> usize {
        self.shared.sweep_expired()
    }

    /// Number of entries currently held, including stale ones not yet swept
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed TTL applied to every entry
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Whether the background sweep task is still alive
    pub fn is_running(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the sweep task and waits for it to exit
    ///
    /// Entries stay readable afterwards but are no longer swept. Calling this
    /// more than once is a no-op.
    pub async fn shutdown(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }
}

impl Drop for TtlCache {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().as_mut() {
            handle.signal();
        }
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("interval", &self.shared.interval)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tokio::time::{advance, sleep};

    const INTERVAL: Duration = Duration::from_secs(5);

    #[test]
    fn test_new_outside_runtime_fails() {
        let result = TtlCache::new(INTERVAL);
        assert_eq!(result.unwrap_err(), CacheError::NoRuntime);
    }

    #[tokio::test]
    async fn test_new_rejects_zero_interval() {
        let result = TtlCache::new(Duration::ZERO);
        assert_eq!(result.unwrap_err(), CacheError::InvalidInterval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_cache_is_empty_and_sweeping() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.interval(), INTERVAL);
        assert!(cache.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_missing_key() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        assert_eq!(cache.get("nope"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_within_ttl_returns_identical_bytes() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        let payload = vec![0u8, 1, 2, 255, 254, b'{', b'}'];
        cache.put("loc1", payload.clone());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(cache.get("loc1"), Some(payload.clone()));

        sleep(Duration::from_secs(3)).await;
        assert_eq!(cache.get("loc1"), Some(payload));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_interval() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.put("loc1", b"{...}".to_vec());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(cache.get("loc1"), Some(b"{...}".to_vec()));

        sleep(Duration::from_secs(4)).await;
        assert_eq!(cache.get("loc1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_removes_stale_entries() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.put("a", b"1".to_vec());
        cache.put("b", b"2".to_vec());
        assert_eq!(cache.len(), 2);

        // Sweep at 5s sees age == interval and keeps them; the 10s sweep evicts
        sleep(Duration::from_secs(11)).await;
        assert!(cache.is_empty());
        assert_eq!(cache.stats().evictions, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_keeps_fresh_entries() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.put("old", b"old".to_vec());

        sleep(Duration::from_secs(8)).await;
        cache.put("new", b"new".to_vec());

        // The 10s sweep evicts "old" (age 10s) but not "new" (age 2s)
        sleep(Duration::from_secs(3)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("new"), Some(b"new".to_vec()));
        assert_eq!(cache.get("old"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrite_resets_age() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.put("k", b"v1".to_vec());

        sleep(Duration::from_secs(4)).await;
        cache.put("k", b"v2".to_vec());
        assert_eq!(cache.get("k"), Some(b"v2".to_vec()));

        // 8s after the first put, 4s after the second
        sleep(Duration::from_secs(4)).await;
        assert_eq!(cache.get("k"), Some(b"v2".to_vec()));
        assert_eq!(cache.len(), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_does_not_extend_ttl() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.put("k", b"v".to_vec());

        for _ in 0..4 {
            sleep(Duration::from_secs(1)).await;
            assert!(cache.get("k").is_some());
        }

        sleep(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_sweep_after_shutdown() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.shutdown().await;
        assert!(!cache.is_running());

        cache.put("a", b"1".to_vec());
        advance(Duration::from_secs(3)).await;
        cache.put("b", b"2".to_vec());
        advance(Duration::from_secs(3)).await;

        // Nothing sweeps in the background any more
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(b"2".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_idempotent() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.shutdown().await;
        cache.shutdown().await;
        assert!(!cache.is_running());

        cache.put("k", b"v".to_vec());
        assert_eq!(cache.get("k"), Some(b"v".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_track_operations() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        cache.put("k", b"v".to_vec());
        cache.put("k", b"w".to_vec());
        cache.get("k");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_and_readers() {
        const WRITERS: usize = 8;
        const READERS: usize = 8;
        const KEYS_PER_WRITER: usize = 200;

        let cache = TtlCache::new(Duration::from_secs(60)).unwrap();
        let value_for = |writer: usize, i: usize| format!("writer-{writer}-value-{i}").into_bytes();

        thread::scope(|scope| {
            for writer in 0..WRITERS {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..KEYS_PER_WRITER {
                        cache.put(format!("w{writer}/k{i}"), value_for(writer, i));
                    }
                });
            }

            for reader in 0..READERS {
                let cache = &cache;
                scope.spawn(move || {
                    for round in 0..KEYS_PER_WRITER * 2 {
                        let writer = (reader + round) % WRITERS;
                        let i = round % KEYS_PER_WRITER;
                        if let Some(value) = cache.get(&format!("w{writer}/k{i}")) {
                            assert_eq!(value, value_for(writer, i), "torn or foreign value");
                        }
                    }
                });
            }

            // Sweeps racing with the writers must not drop fresh entries
            let cache = &cache;
            scope.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(cache.sweep_expired(), 0);
                }
            });
        });

        assert_eq!(cache.len(), WRITERS * KEYS_PER_WRITER);
        for writer in 0..WRITERS {
            for i in 0..KEYS_PER_WRITER {
                assert_eq!(
                    cache.get(&format!("w{writer}/k{i}")),
                    Some(value_for(writer, i))
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_sweep_task() {
        let cache = TtlCache::new(INTERVAL).unwrap();
        let shared = Arc::clone(&cache.shared);
        assert_eq!(Arc::strong_count(&shared), 3);

        drop(cache);
        // Let the task observe the closed channel and release its reference
        sleep(Duration::from_millis(10)).await;
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}
