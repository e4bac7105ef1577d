//! PokeAPI data models and client
//!
//! Only the fields the REPL actually prints or reasons about are modelled.
//! Everything else in the (very large) API payloads is ignored on decode.

mod client;
#[cfg(test)]
pub(crate) mod fake;

pub use client::{
    ApiError, Fetcher, HttpFetcher, PokeApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};

use serde::{Deserialize, Serialize};

/// A `{ name, url }` reference to another API resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One page of the location-area listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationPage {
    /// Total number of location areas
    #[serde(default)]
    pub count: u64,
    /// URL of the following page, `None` on the last page
    pub next: Option<String>,
    /// URL of the preceding page, `None` on the first page
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

/// A location area with the Pokemon that can be encountered there
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationArea {
    pub name: String,
    #[serde(default)]
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}

impl LocationArea {
    /// Names of every Pokemon encounterable in this area, in API order
    pub fn pokemon_names(&self) -> impl Iterator<Item = &str> {
        self.pokemon_encounters
            .iter()
            .map(|encounter| encounter.pokemon.name.as_str())
    }
}

/// A Pokemon's full record, as stored in the Pokedex once caught
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub name: String,
    /// Experience gained for defeating it; higher means harder to catch.
    /// Null for some alternate forms.
    #[serde(default)]
    pub base_experience: Option<u32>,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonType {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}
