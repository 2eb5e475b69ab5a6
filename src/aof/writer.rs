//! AOF writer
//!
//! Handles appending requests to the AOF file.

use super::{CommandLog, SyncPolicy};
use crate::protocol::{RespEncoder, RespValue};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// AOF writer
///
/// Shared by every connection; appends are serialized by the file mutex.
pub struct AofWriter {
    file: Mutex<File>,
    sync_policy: SyncPolicy,
    last_sync: Mutex<Instant>,
}

impl AofWriter {
    /// Open (or create) the AOF for appending
    pub fn new<P: AsRef<Path>>(path: P, sync_policy: SyncPolicy) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(AofWriter {
            file: Mutex::new(file),
            sync_policy,
            last_sync: Mutex::new(Instant::now()),
        })
    }

    /// Write a request to the AOF
    pub fn write(&self, request: &RespValue) -> io::Result<()> {
        let bytes = RespEncoder::encode(request);

        let mut file = lock(&self.file);
        file.write_all(&bytes)?;

        // Apply sync policy
        match self.sync_policy {
            SyncPolicy::Always => {
                file.sync_all()?;
            }
            SyncPolicy::EverySecond => {
                let mut last_sync = lock(&self.last_sync);
                if last_sync.elapsed() >= Duration::from_secs(1) {
                    file.sync_all()?;
                    *last_sync = Instant::now();
                }
            }
            SyncPolicy::No => {}
        }

        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&self) -> io::Result<()> {
        let mut file = lock(&self.file);
        file.flush()?;
        file.sync_all()?;
        *lock(&self.last_sync) = Instant::now();
        Ok(())
    }
}

impl CommandLog for AofWriter {
    fn append(&self, request: &RespValue) -> io::Result<()> {
        self.write(request)
    }

    fn close(&self) -> io::Result<()> {
        self.sync()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
