//! Command registry
//!
//! Static table of every supported command, looked up by upper-cased name.

use super::{admin, hash, list, string, Arity, Handler};
use std::collections::HashMap;

/// One entry of the command table
pub struct CommandSpec {
    /// Upper-case command name
    pub name: &'static str,
    pub arity: Arity,
    /// Appended to the durability log before execution
    pub logged: bool,
    pub handler: Handler,
}

static COMMANDS: &[CommandSpec] = &[
    // String commands
    CommandSpec { name: "SET", arity: Arity::Exact(2), logged: true, handler: string::set },
    CommandSpec { name: "GET", arity: Arity::Exact(1), logged: false, handler: string::get },

    // Hash commands
    CommandSpec { name: "HSET", arity: Arity::AtLeast(3), logged: true, handler: hash::hset },
    CommandSpec { name: "HGET", arity: Arity::Exact(2), logged: false, handler: hash::hget },

    // List commands
    CommandSpec { name: "LPUSH", arity: Arity::AtLeast(2), logged: false, handler: list::lpush },
    CommandSpec { name: "RPUSH", arity: Arity::AtLeast(2), logged: false, handler: list::rpush },
    CommandSpec { name: "LPOP", arity: Arity::Exact(1), logged: false, handler: list::lpop },
    CommandSpec { name: "RPOP", arity: Arity::Exact(1), logged: false, handler: list::rpop },
    CommandSpec { name: "LRANGE", arity: Arity::Exact(3), logged: false, handler: list::lrange },
    CommandSpec { name: "LINDEX", arity: Arity::Exact(2), logged: false, handler: list::lindex },
    CommandSpec { name: "LLEN", arity: Arity::Exact(1), logged: false, handler: list::llen },
    CommandSpec { name: "LSET", arity: Arity::Exact(3), logged: false, handler: list::lset },

    // Admin commands
    CommandSpec { name: "PING", arity: Arity::Any, logged: false, handler: admin::ping },
    CommandSpec { name: "COMMAND", arity: Arity::Any, logged: false, handler: admin::command },
];

/// Registry of all available commands
pub struct CommandRegistry {
    commands: HashMap<&'static str, &'static CommandSpec>,
}

impl CommandRegistry {
    /// Create a new command registry over the static command table
    pub fn new() -> Self {
        let commands = COMMANDS.iter().map(|spec| (spec.name, spec)).collect();
        CommandRegistry { commands }
    }

    /// Get a command by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&'static CommandSpec> {
        self.commands.get(name.to_uppercase().as_str()).copied()
    }

    /// Get all command names
    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
