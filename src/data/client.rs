//! PokeAPI HTTP client
//!
//! Every request goes through the shared `TtlCache` first. Only bodies that
//! decode successfully are cached, so a malformed or error response is never
//! served from the cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::{LocationArea, LocationPage, Pokemon};
use crate::cache::TtlCache;

/// Base URL for the PokeAPI
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("pokedex/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when fetching data from the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API has no such resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Failed to parse JSON response
    #[error("Failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of raw response bodies
///
/// Implemented over HTTP for the real client and in memory for tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the full body at `url`, failing on any non-success response
    async fn get(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

/// `Fetcher` backed by a reqwest client with a bounded timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(url).send().await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.bytes().await?;
                Ok(body.to_vec())
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(url.to_string())),
            status => Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

/// Client for the three PokeAPI endpoints the REPL uses
pub struct PokeApiClient<F = HttpFetcher> {
    fetcher: F,
    cache: Arc<TtlCache>,
    /// Base URL for the API, without a trailing slash
    base_url: String,
}

impl<F: Fetcher> PokeApiClient<F> {
    /// Creates a client that fetches through `fetcher` and caches in `cache`
    pub fn new(fetcher: F, cache: Arc<TtlCache>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            fetcher,
            cache,
            base_url,
        }
    }

    /// URL of the first location-area page
    pub fn first_page_url(&self) -> String {
        format!("{}/location-area/", self.base_url)
    }

    fn area_url(&self, area_name: &str) -> String {
        format!("{}/location-area/{}/", self.base_url, area_name)
    }

    fn pokemon_url(&self, name: &str) -> String {
        format!("{}/pokemon/{}/", self.base_url, name)
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Fetches one page of the location-area listing
    ///
    /// # Arguments
    /// * `url` - A page URL: `first_page_url()` or a `next`/`previous` cursor
    pub async fn fetch_locations_page(&self, url: &str) -> Result<LocationPage, ApiError> {
        self.fetch_cached(url).await
    }

    /// Fetches a location area and the Pokemon that can be encountered there
    pub async fn fetch_area_encounters(&self, area_name: &str) -> Result<LocationArea, ApiError> {
        self.fetch_cached(&self.area_url(area_name)).await
    }

    /// Fetches a Pokemon's full record
    pub async fn fetch_pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        self.fetch_cached(&self.pokemon_url(name)).await
    }

    /// Decodes the cached body for `url`, fetching and caching it on a miss
    ///
    /// The cache lock is never held across the network call; the body is
    /// only inserted once it has decoded.
    async fn fetch_cached<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        if let Some(body) = self.cache.get(url) {
            debug!(url, "cache hit");
            return Ok(serde_json::from_slice(&body)?);
        }

        debug!(url, "cache miss, fetching");
        let body = self.fetcher.get(url).await?;
        let decoded = serde_json::from_slice(&body)?;
        self.cache.put(url, body);
        Ok(decoded)
    }
}
