//! Caught Pokemon and catch odds
//!
//! A catch succeeds when a roll in `0..CATCH_ROLL_CEILING` beats the
//! Pokemon's base experience, so strong Pokemon escape more often.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::Pokemon;

/// Exclusive upper bound of a catch roll
pub const CATCH_ROLL_CEILING: u32 = 1000;

/// Source of catch rolls
///
/// Any `FnMut() -> u32` closure works, which keeps catches deterministic in
/// tests.
pub trait CatchRoll {
    /// Draws a value in `0..CATCH_ROLL_CEILING`
    fn roll(&mut self) -> u32;
}

impl<F: FnMut() -> u32> CatchRoll for F {
    fn roll(&mut self) -> u32 {
        self()
    }
}

/// Uniform random rolls from a seeded RNG
#[derive(Debug)]
pub struct RandomRoll {
    rng: StdRng,
}

impl Default for RandomRoll {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomRoll {
    /// Reproducible rolls from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl CatchRoll for RandomRoll {
    fn roll(&mut self) -> u32 {
        self.rng.gen_range(0..CATCH_ROLL_CEILING)
    }
}

/// Whether a roll catches a Pokemon with the given base experience
pub fn is_caught(base_experience: u32, roll: u32) -> bool {
    base_experience < roll
}

/// The user's caught Pokemon keyed by the name they were caught under
#[derive(Debug, Default)]
pub struct Inventory {
    caught: BTreeMap<String, Pokemon>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.caught.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Pokemon> {
        self.caught.get(name)
    }

    /// Adds a Pokemon, returning `false` if the name was already taken
    pub fn insert(&mut self, name: impl Into<String>, pokemon: Pokemon) -> bool {
        match self.caught.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(pokemon);
                true
            }
        }
    }

    /// Caught names in alphabetical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.caught.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.caught.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caught.is_empty()
    }
}
