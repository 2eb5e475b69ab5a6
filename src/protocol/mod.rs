//! RESP2 protocol implementation
//!
//! This module handles framing, parsing and encoding of the Redis Serialization
//! Protocol (RESP2). It is completely independent from other modules.

mod types;
mod resp;

pub use types::{RespValue, RespError};
pub use resp::{RespParser, RespEncoder};
