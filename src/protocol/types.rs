//! RESP2 value types
//!
//! Defines the core data types for RESP2 protocol

use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// RESP2 value types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple strings: +OK\r\n
    SimpleString(String),

    /// Errors: -Error message\r\n
    Error(String),

    /// Integers: :1000\r\n
    Integer(i64),

    /// Bulk strings: $6\r\nfoobar\r\n
    BulkString(Bytes),

    /// Null bulk string: $-1\r\n
    Null,

    /// Arrays: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
    Array(Vec<RespValue>),

    /// Pre-encoded bytes, written to the wire verbatim
    Raw(Bytes),
}

impl RespValue {
    /// Create a simple string
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Create an error
    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    /// Create an integer
    pub fn integer(i: i64) -> Self {
        RespValue::Integer(i)
    }

    /// Create a bulk string from bytes
    pub fn bulk_string(b: impl Into<Bytes>) -> Self {
        RespValue::BulkString(b.into())
    }

    /// Create a null value
    pub fn null() -> Self {
        RespValue::Null
    }

    /// Create an array
    pub fn array(v: Vec<RespValue>) -> Self {
        RespValue::Array(v)
    }

    /// Create a raw passthrough value
    pub fn raw(b: impl Into<Bytes>) -> Self {
        RespValue::Raw(b.into())
    }

    /// Build a request array out of bulk strings
    pub fn command<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        RespValue::Array(parts.into_iter().map(|p| RespValue::BulkString(p.into())).collect())
    }

    /// Check if this is an error reply
    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Try to extract array elements
    pub fn as_array(&self) -> Option<&Vec<RespValue>> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to extract bulk string bytes
    pub fn as_bulk_string(&self) -> Option<&Bytes> {
        match self {
            RespValue::BulkString(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "SimpleString({})", s),
            RespValue::Error(e) => write!(f, "Error({})", e),
            RespValue::Integer(i) => write!(f, "Integer({})", i),
            RespValue::BulkString(b) => write!(f, "BulkString({} bytes)", b.len()),
            RespValue::Null => write!(f, "Null"),
            RespValue::Array(arr) => write!(f, "Array({} elements)", arr.len()),
            RespValue::Raw(b) => write!(f, "Raw({} bytes)", b.len()),
        }
    }
}

/// RESP parsing errors
///
/// Every variant except `Incomplete` means the byte stream can no longer be
/// trusted and the connection must be dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RespError {
    /// Incomplete data, need more bytes
    #[error("incomplete frame")]
    Incomplete,

    /// Leading byte is not a known RESP type tag
    #[error("unknown type prefix: {0:?}")]
    UnknownType(char),

    /// A header line did not end with CRLF
    #[error("line is not terminated by CRLF")]
    MissingCrlf,

    /// A length or integer field could not be parsed
    #[error("invalid integer field: {0:?}")]
    InvalidInteger(String),

    /// Invalid protocol format
    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),

    /// Invalid UTF-8 in a simple string or error line
    #[error("invalid UTF-8")]
    InvalidUtf8,
}
