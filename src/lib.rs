//! quickdb - an in-memory key-value server speaking RESP
//!
//! quickdb is designed with strong cohesion and loose coupling principles:
//! - Each module has a single, well-defined responsibility
//! - Modules communicate through clear, minimal interfaces
//! - Shared state lives in one engine with a lock per table

pub mod protocol;
pub mod quicklist;
pub mod store;
pub mod commands;
pub mod dispatch;
pub mod server;
pub mod aof;
pub mod config;

/// Re-export commonly used types
pub use protocol::{RespValue, RespError};
pub use quicklist::{Quicklist, ListError};
pub use store::{Engine, ListSide};
pub use commands::{CommandContext, CommandError, ReplyStyle};
pub use dispatch::Dispatcher;
pub use config::ServerConfig;
