//! In-memory `Fetcher` for tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ApiError, Fetcher};

/// Serves canned bodies by URL and counts how often each URL was requested.
/// Unknown URLs answer `ApiError::NotFound`.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeFetcher {
    bodies: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.lock().insert(url.to_string(), body.into());
        self
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        *self.calls.lock().entry(url.to_string()).or_default() += 1;
        self.bodies
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(url.to_string()))
    }
}
