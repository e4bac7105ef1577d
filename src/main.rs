//! Pokedex CLI - explore PokeAPI from a terminal prompt
//!
//! Reads commands line by line from stdin until `exit` or end of input.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pokedex::app::{App, Outcome};
use pokedex::cache::TtlCache;
use pokedex::cli::{Cli, Config};
use pokedex::data::{HttpFetcher, PokeApiClient};
use pokedex::inventory::RandomRoll;

const PROMPT: &str = "Pokedex > ";

/// Sets up logging to stderr so it never interleaves with REPL output.
/// `RUST_LOG` overrides the default of warnings only.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pokedex=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    info!(?config, "starting");

    let cache = Arc::new(TtlCache::new(config.cache_interval)?);
    let fetcher = HttpFetcher::new(config.timeout)?;
    let client = PokeApiClient::new(fetcher, Arc::clone(&cache), config.base_url);
    let mut app = App::new(client, RandomRoll::default());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        print!("{PROMPT}");
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            // End of input behaves like `exit`
            println!();
            break;
        };

        if app.handle_line(&line, &mut stdout).await == Outcome::Exit {
            break;
        }
    }

    debug!(stats = ?cache.stats(), entries = cache.len(), "cache statistics");
    cache.shutdown().await;

    Ok(())
}
