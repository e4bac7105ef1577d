//! Pokedex CLI Library
//!
//! An interactive Pokedex backed by PokeAPI. Responses are held in an
//! in-memory TTL cache so repeated lookups within the interval stay local.

pub mod app;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod data;
pub mod inventory;
