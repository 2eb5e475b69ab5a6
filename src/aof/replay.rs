//! AOF replay
//!
//! Handles replaying logged requests to reconstruct the database state.

use crate::dispatch::Dispatcher;
use crate::protocol::RespValue;
use tracing::{debug, warn};

/// Replay AOF entries through a dispatcher
///
/// Entries are executed in file order and are not appended to the log again.
/// A request that fails is logged and skipped. Returns the number of
/// entries applied.
pub fn replay_entries(dispatcher: &Dispatcher, entries: Vec<RespValue>) -> usize {
    let mut replayed = 0;

    for entry in entries {
        match dispatcher.execute_unlogged(&entry) {
            Ok(reply) if reply.is_error() => {
                warn!("AOF entry replied with {}. Skipping.", reply);
            }
            Ok(_) => replayed += 1,
            Err(e) => {
                warn!("Failed to replay AOF entry: {}. Skipping.", e);
            }
        }
    }

    debug!("Replayed {} AOF entries", replayed);
    replayed
}
