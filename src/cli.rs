//! Command-line interface parsing for the Pokedex REPL
//!
//! Every option can also be set through an environment variable. `Config`
//! is the validated, typed form the rest of the program consumes.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::cache::DEFAULT_INTERVAL;
use crate::data::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The base URL is blank
    #[error("Base URL must not be empty")]
    EmptyBaseUrl,

    /// The base URL is not http(s)
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// Pokedex - explore PokeAPI locations and catch Pokemon from your terminal
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "An interactive Pokedex backed by PokeAPI")]
#[command(version)]
pub struct Cli {
    /// Seconds an API response stays cached
    #[arg(
        long,
        env = "POKEDEX_CACHE_INTERVAL",
        value_name = "SECS",
        default_value_t = DEFAULT_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub cache_interval: u64,

    /// PokeAPI base URL
    #[arg(long, env = "POKEDEX_BASE_URL", value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds before an HTTP request is abandoned
    #[arg(
        long,
        env = "POKEDEX_TIMEOUT",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL of cached responses, also the sweep period
    pub cache_interval: Duration,
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_interval: DEFAULT_INTERVAL,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Creates a Config from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Config)` with durations and a normalized base URL
    /// * `Err(CliError)` if the base URL is unusable
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Ok(Self {
            cache_interval: Duration::from_secs(cli.cache_interval),
            base_url: normalize_base_url(&cli.base_url)?,
            timeout: Duration::from_secs(cli.timeout),
        })
    }
}

/// Trims whitespace and trailing slashes, and checks the scheme
fn normalize_base_url(raw: &str) -> Result<String, CliError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(CliError::EmptyBaseUrl);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CliError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url.to_string())
}
