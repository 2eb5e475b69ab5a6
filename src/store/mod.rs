//! In-memory storage module
//!
//! Owns the three process-wide tables (strings, hashes, lists). Each table sits
//! behind its own reader-writer lock, so a write to one table never blocks a
//! read of another. This module knows nothing about the wire protocol.

mod engine;

pub use engine::{Engine, ListSide, StoreError, StoreStats};
