//! Command execution module
//!
//! Every command is a plain function registered in a static table with its
//! arity. Handlers receive the arguments after the command name and return a
//! reply or a `CommandError`, which the dispatcher turns into an error reply.

mod context;
mod registry;

// Command implementations
mod string;
mod hash;
mod list;
mod admin;

pub use context::{CommandContext, ReplyStyle};
pub use registry::{CommandRegistry, CommandSpec};

use crate::protocol::RespValue;
use crate::quicklist::ListError;
use crate::store::StoreError;
use bytes::Bytes;
use thiserror::Error;

/// Result of a command handler
pub type CommandResult = Result<RespValue, CommandError>;

/// Command handler signature
pub type Handler = fn(&CommandContext, &[RespValue]) -> CommandResult;

/// Accepted argument counts, not counting the command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, argc: usize) -> bool {
        match *self {
            Arity::Exact(n) => argc == n,
            Arity::AtLeast(n) => argc >= n,
            Arity::Any => true,
        }
    }
}

/// Command-level failures
///
/// None of these end the connection; each one becomes a `-ERR` reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// Request is not an array of bulk strings
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("no such list '{0}'")]
    NoSuchList(String),

    #[error("list is empty")]
    ListEmpty,

    #[error("index out of range")]
    IndexOutOfRange,

    #[error("value is not an integer or out of range")]
    NotAnInteger,

    /// The durability log refused the write, so it was not applied
    #[error("failed to append to the log: {0}")]
    Log(String),
}

impl CommandError {
    /// Error reply sent to the client
    ///
    /// Messages can echo client bytes, so line breaks are flattened to keep
    /// the reply on one line.
    pub fn to_resp(&self) -> RespValue {
        let message = format!("ERR {}", self).replace(['\r', '\n'], " ");
        RespValue::error(message)
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NoSuchList(key) => {
                CommandError::NoSuchList(String::from_utf8_lossy(&key).into_owned())
            }
            StoreError::List(ListError::Empty) => CommandError::ListEmpty,
            StoreError::List(ListError::IndexOutOfRange) => CommandError::IndexOutOfRange,
        }
    }
}

/// Helper function to extract bulk string from RespValue
pub(crate) fn extract_bulk_string(value: &RespValue) -> Result<&Bytes, CommandError> {
    value
        .as_bulk_string()
        .ok_or(CommandError::InvalidRequest("arguments must be bulk strings"))
}

/// Helper function to extract integer from RespValue or parse from bulk string
pub(crate) fn extract_integer(value: &RespValue) -> Result<i64, CommandError> {
    match value {
        RespValue::Integer(i) => Ok(*i),
        RespValue::BulkString(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(CommandError::NotAnInteger),
        _ => Err(CommandError::NotAnInteger),
    }
}

/// Bulk string argument at `index`
pub(crate) fn bulk_arg(args: &[RespValue], index: usize) -> Result<&Bytes, CommandError> {
    args.get(index)
        .ok_or(CommandError::InvalidRequest("missing argument"))
        .and_then(extract_bulk_string)
}

/// Integer argument at `index`
pub(crate) fn integer_arg(args: &[RespValue], index: usize) -> Result<i64, CommandError> {
    args.get(index)
        .ok_or(CommandError::InvalidRequest("missing argument"))
        .and_then(extract_integer)
}
