//! Append-Only File (AOF) persistence module
//!
//! Provides durability by logging write commands to disk as the RESP frames
//! the client sent. Replaying the file through the dispatcher on startup
//! rebuilds the tables.

mod writer;
mod reader;
mod replay;

pub use writer::AofWriter;
pub use reader::AofReader;
pub use replay::replay_entries;

use crate::protocol::RespValue;
use serde::Deserialize;
use std::io;
use std::path::PathBuf;

/// Durability log consumed by the dispatcher
///
/// `append` is called synchronously, in request order, before the reply is
/// sent. `close` is called when a connection ends.
pub trait CommandLog: Send + Sync {
    /// Record a request
    fn append(&self, request: &RespValue) -> io::Result<()>;

    /// Flush everything appended so far
    fn close(&self) -> io::Result<()>;
}

/// AOF sync policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPolicy {
    /// Sync after every write (safest, slowest)
    Always,
    /// Sync every second (balanced)
    #[default]
    #[serde(rename = "everysec")]
    EverySecond,
    /// Let the OS decide when to sync (fastest, least safe)
    No,
}

/// AOF configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AofConfig {
    /// Path to the AOF file
    pub path: PathBuf,
    /// Sync policy
    pub sync_policy: SyncPolicy,
    /// Whether to enable AOF
    pub enabled: bool,
}

impl Default for AofConfig {
    fn default() -> Self {
        AofConfig {
            path: PathBuf::from("quickdb.aof"),
            sync_policy: SyncPolicy::default(),
            enabled: true,
        }
    }
}
