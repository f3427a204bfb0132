/// Command types.
use std::fmt;

use serde::{Deserialize, Serialize};

/// The verbs the assistant understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Start,
    Report,
    Fetch,
    Extract,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verb::Start => "start",
            Verb::Report => "report",
            Verb::Fetch => "fetch",
            Verb::Extract => "extract",
        };
        f.write_str(s)
    }
}

/// A command entry in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDef {
    pub verb: Verb,
    pub description: String,
    /// Single-word names, typed with a leading `/` in Telegram (e.g. "report").
    pub slash_names: Vec<String>,
    /// Free-text phrases recognized at the start of a plain message (e.g. "tạo báo cáo").
    pub phrases: Vec<String>,
    /// Whether text after the command is meaningful.
    pub accepts_args: bool,
}

impl CommandDef {
    /// Primary slash alias for help menus.
    pub fn primary_alias(&self) -> String {
        match self.slash_names.first() {
            Some(name) => format!("/{name}"),
            None => self.verb.to_string(),
        }
    }
}

/// A detected command and whatever followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub verb: Verb,
    /// The alias as the user typed it.
    pub raw_alias: String,
    /// Remaining text after the command, original casing preserved.
    pub raw_args: String,
}

/// The closed set of handling modes an inbound event resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Report,
    /// Raw URL argument, validated by the fetch handler.
    Fetch(String),
    Extract,
    /// Free text for the language model.
    Chat(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Report => "report",
            Command::Fetch(_) => "fetch",
            Command::Extract => "extract",
            Command::Chat(_) => "chat",
        }
    }
}

impl From<CommandInvocation> for Command {
    fn from(inv: CommandInvocation) -> Self {
        match inv.verb {
            Verb::Start => Command::Start,
            Verb::Report => Command::Report,
            Verb::Fetch => Command::Fetch(inv.raw_args),
            Verb::Extract => Command::Extract,
        }
    }
}
