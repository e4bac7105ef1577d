//! REPL command table and input parsing
//!
//! Commands are a closed enum looked up through a static table, so the set
//! of commands and their help text is fixed at compile time.

use std::io;

use thiserror::Error;

use crate::data::ApiError;

/// Every command the REPL understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Map,
    MapBack,
    Explore,
    Catch,
    Inspect,
    Pokedex,
}

/// Static description of a command
#[derive(Debug)]
pub struct CommandSpec {
    /// Word typed at the prompt
    pub name: &'static str,
    /// Name of the required argument, if any
    pub argument: Option<&'static str>,
    pub description: &'static str,
    pub command: Command,
}

/// Lookup table, in the order `help` lists commands
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        argument: None,
        description: "Displays a help message",
        command: Command::Help,
    },
    CommandSpec {
        name: "map",
        argument: None,
        description: "Displays the next 20 location areas",
        command: Command::Map,
    },
    CommandSpec {
        name: "mapb",
        argument: None,
        description: "Displays the previous 20 location areas",
        command: Command::MapBack,
    },
    CommandSpec {
        name: "explore",
        argument: Some("area"),
        description: "Lists the Pokemon found in a location area",
        command: Command::Explore,
    },
    CommandSpec {
        name: "catch",
        argument: Some("pokemon"),
        description: "Tries to catch a Pokemon",
        command: Command::Catch,
    },
    CommandSpec {
        name: "inspect",
        argument: Some("pokemon"),
        description: "Shows details of a caught Pokemon",
        command: Command::Inspect,
    },
    CommandSpec {
        name: "pokedex",
        argument: None,
        description: "Lists every caught Pokemon",
        command: Command::Pokedex,
    },
    CommandSpec {
        name: "exit",
        argument: None,
        description: "Exit the Pokedex",
        command: Command::Exit,
    },
];

impl Command {
    /// Looks up a command by the word typed at the prompt
    pub fn from_name(name: &str) -> Option<Self> {
        COMMANDS
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.command)
    }

    pub fn spec(&self) -> &'static CommandSpec {
        COMMANDS
            .iter()
            .find(|spec| spec.command == *self)
            .unwrap_or_else(|| unreachable!("every command has a table entry"))
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }
}

impl CommandSpec {
    /// `name <argument>` as shown in help and usage errors
    pub fn usage(&self) -> String {
        match self.argument {
            Some(argument) => format!("{} <{}>", self.name, argument),
            None => self.name.to_string(),
        }
    }
}

/// Errors reported to the user; none of them end the REPL
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: '{0}'. Type 'help' to see available commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    MissingArgument(String),

    #[error("you're on the first page")]
    FirstPage,

    #[error("you're on the last page")]
    LastPage,

    #[error("You already have {0} in your Pokedex")]
    AlreadyCaught(String),

    #[error("you have not caught {0}")]
    NotCaught(String),

    #[error("Your Pokedex is empty. Go catch some Pokemon!")]
    EmptyInventory,

    #[error("Found no Pokemon in {0}")]
    NoEncounters(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Whether the error came from the API or the terminal rather than from
    /// what the user typed
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Io(_))
    }
}

/// A parsed prompt line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub command: Command,
    pub args: Vec<String>,
}

impl Input {
    /// The command's required argument, or a usage error if it is missing
    pub fn required_arg(&self) -> Result<&str, CommandError> {
        self.args
            .first()
            .map(String::as_str)
            .ok_or_else(|| CommandError::MissingArgument(self.command.spec().usage()))
    }
}

/// Lowercases a prompt line and splits it into words
pub fn clean_input(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

/// Parses a prompt line into a command and its arguments
///
/// # Returns
/// * `Ok(Some(Input))` for a known command
/// * `Ok(None)` for a blank line
/// * `Err(CommandError::Unknown)` for anything else
pub fn parse_input(line: &str) -> Result<Option<Input>, CommandError> {
    let mut words = clean_input(line).into_iter();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let command = Command::from_name(&name).ok_or(CommandError::Unknown(name))?;
    Ok(Some(Input {
        command,
        args: words.collect(),
    }))
}
