//! Application state and command handlers
//!
//! `App` owns everything a REPL session mutates: the page cursor, the
//! inventory and the catch roller. Handlers write plain text to any
//! `io::Write`, so the same code serves stdout and test buffers.

use std::io::Write;

use tracing::{debug, warn};

use crate::commands::{parse_input, Command, CommandError, Input, COMMANDS};
use crate::data::{Fetcher, HttpFetcher, LocationPage, PokeApiClient};
use crate::inventory::{is_caught, CatchRoll, Inventory, RandomRoll};

/// What the REPL should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// Position in the location-area listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// Page `map` will show next, `None` after the last page
    pub next: Option<String>,
    /// Page `mapb` will show, `None` while on the first page
    pub previous: Option<String>,
    /// Whether the last page shown was the first one (or nothing was shown yet)
    pub on_first_page: bool,
}

impl PageCursor {
    /// Cursor before any page has been shown
    pub fn start(first_page_url: String) -> Self {
        Self {
            next: Some(first_page_url),
            previous: None,
            on_first_page: true,
        }
    }

    /// Moves the cursor to a page that was just shown
    fn show(&mut self, page: &LocationPage) {
        self.next = page.next.clone();
        self.previous = page.previous.clone();
        self.on_first_page = page.previous.is_none();
    }
}

/// Main application struct managing session state
pub struct App<F = HttpFetcher, R = RandomRoll> {
    client: PokeApiClient<F>,
    inventory: Inventory,
    cursor: PageCursor,
    roller: R,
}

impl<F: Fetcher, R: CatchRoll> App<F, R> {
    /// Creates a session with an empty inventory, positioned before page one
    pub fn new(client: PokeApiClient<F>, roller: R) -> Self {
        let cursor = PageCursor::start(client.first_page_url());
        Self {
            client,
            inventory: Inventory::new(),
            cursor,
            roller,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Parses and runs one prompt line, printing any error to `out`
    ///
    /// Errors never end the session; only `exit` does.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Outcome {
        let result = match parse_input(line) {
            Ok(Some(input)) => self.execute(&input, out).await,
            Ok(None) => Ok(Outcome::Continue),
            Err(err) => Err(err),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_failure() {
                    warn!(line, error = %err, "command failed");
                } else {
                    debug!(line, error = %err, "command rejected");
                }
                if let Err(write_err) = writeln!(out, "{err}") {
                    debug!(error = %write_err, "failed to print command error");
                }
                Outcome::Continue
            }
        }
    }

    /// Runs a parsed command
    pub async fn execute<W: Write>(
        &mut self,
        input: &Input,
        out: &mut W,
    ) -> Result<Outcome, CommandError> {
        debug!(command = input.command.name(), args = ?input.args, "executing");

        match input.command {
            Command::Exit => {
                writeln!(out, "Closing the Pokedex... Goodbye!")?;
                return Ok(Outcome::Exit);
            }
            Command::Help => self.help(out)?,
            Command::Map => self.map(out).await?,
            Command::MapBack => self.map_back(out).await?,
            Command::Explore => self.explore(input.required_arg()?, out).await?,
            Command::Catch => self.catch(input.required_arg()?, out).await?,
            Command::Inspect => self.inspect(input.required_arg()?, out)?,
            Command::Pokedex => self.pokedex(out)?,
        }
        Ok(Outcome::Continue)
    }

    fn help<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Welcome to the Pokedex!")?;
        writeln!(out, "Usage:")?;
        writeln!(out)?;
        for spec in COMMANDS {
            writeln!(out, "{}: {}", spec.usage(), spec.description)?;
        }
        Ok(())
    }

    async fn map<W: Write>(&mut self, out: &mut W) -> Result<(), CommandError> {
        let url = self.cursor.next.clone().ok_or(CommandError::LastPage)?;
        self.show_page(&url, out).await
    }

    async fn map_back<W: Write>(&mut self, out: &mut W) -> Result<(), CommandError> {
        if self.cursor.on_first_page {
            return Err(CommandError::FirstPage);
        }
        let url = self.cursor.previous.clone().ok_or(CommandError::FirstPage)?;
        self.show_page(&url, out).await
    }

    async fn show_page<W: Write>(&mut self, url: &str, out: &mut W) -> Result<(), CommandError> {
        let page = self.client.fetch_locations_page(url).await?;
        for area in &page.results {
            writeln!(out, "{}", area.name)?;
        }
        self.cursor.show(&page);
        Ok(())
    }

    async fn explore<W: Write>(&mut self, area: &str, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Exploring {area}...")?;
        let location = self.client.fetch_area_encounters(area).await?;
        if location.pokemon_encounters.is_empty() {
            return Err(CommandError::NoEncounters(area.to_string()));
        }

        writeln!(out, "Found Pokemon:")?;
        for name in location.pokemon_names() {
            writeln!(out, "- {name}")?;
        }
        Ok(())
    }

    async fn catch<W: Write>(&mut self, name: &str, out: &mut W) -> Result<(), CommandError> {
        if self.inventory.contains(name) {
            return Err(CommandError::AlreadyCaught(name.to_string()));
        }

        let pokemon = self.client.fetch_pokemon(name).await?;
        writeln!(out, "Throwing a Pokeball at {name}...")?;

        let roll = self.roller.roll();
        let base_experience = pokemon.base_experience.unwrap_or(0);
        debug!(name, base_experience, roll, "catch roll");

        if is_caught(base_experience, roll) {
            self.inventory.insert(name, pokemon);
            writeln!(out, "{name} was caught!")?;
            writeln!(out, "You may now inspect it with the inspect command.")?;
        } else {
            writeln!(out, "{name} escaped!")?;
        }
        Ok(())
    }

    fn inspect<W: Write>(&self, name: &str, out: &mut W) -> Result<(), CommandError> {
        let pokemon = self
            .inventory
            .get(name)
            .ok_or_else(|| CommandError::NotCaught(name.to_string()))?;

        writeln!(out, "Name: {}", pokemon.name)?;
        writeln!(out, "Height: {}", pokemon.height)?;
        writeln!(out, "Weight: {}", pokemon.weight)?;
        writeln!(out, "Stats:")?;
        for stat in &pokemon.stats {
            writeln!(out, "  -{}: {}", stat.stat.name, stat.base_stat)?;
        }
        writeln!(out, "Types:")?;
        for kind in &pokemon.types {
            writeln!(out, "  - {}", kind.kind.name)?;
        }
        Ok(())
    }

    fn pokedex<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        if self.inventory.is_empty() {
            return Err(CommandError::EmptyInventory);
        }

        writeln!(out, "Your Pokedex:")?;
        for name in self.inventory.names() {
            writeln!(out, " - {name}")?;
        }
        Ok(())
    }
}
