//! Concurrent table engine

use crate::quicklist::{ListError, Quicklist, DEFAULT_NODE_CAPACITY};
use bytes::Bytes;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Type alias for our hash maps with SipHasher
type TableMap<V> = HashMap<Bytes, V, BuildHasherDefault<SipHasher13>>;

type StringTable = TableMap<Bytes>;
type HashTable = TableMap<TableMap<Bytes>>;
type ListTable = TableMap<Quicklist>;

/// Which end of a list an operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSide {
    Left,
    Right,
}

/// Errors raised by list operations on the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The named list was never created
    #[error("no such list '{}'", String::from_utf8_lossy(.0))]
    NoSuchList(Bytes),

    #[error(transparent)]
    List(#[from] ListError),
}

/// Table sizes, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub strings: usize,
    pub hashes: usize,
    pub lists: usize,
}

/// Shared data engine
///
/// Locks are held only for the lookup or mutation itself. There is no
/// ordering guarantee between writes to different tables.
pub struct Engine {
    strings: RwLock<StringTable>,
    hashes: RwLock<HashTable>,
    lists: RwLock<ListTable>,

    /// Node capacity given to lists created by a push
    list_node_capacity: usize,
}

impl Engine {
    /// Create an engine with the default list node capacity
    pub fn new() -> Self {
        Self::with_list_node_capacity(DEFAULT_NODE_CAPACITY)
    }

    pub fn with_list_node_capacity(list_node_capacity: usize) -> Self {
        Engine {
            strings: RwLock::new(TableMap::default()),
            hashes: RwLock::new(TableMap::default()),
            lists: RwLock::new(TableMap::default()),
            list_node_capacity,
        }
    }

    /// Upsert a string value, last writer wins
    pub fn set(&self, key: Bytes, value: Bytes) {
        write(&self.strings).insert(key, value);
    }

    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        read(&self.strings).get(key).cloned()
    }

    /// Upsert a hash field, creating the hash on first write
    pub fn hset(&self, hash: Bytes, field: Bytes, value: Bytes) {
        write(&self.hashes)
            .entry(hash)
            .or_default()
            .insert(field, value);
    }

    pub fn hget(&self, hash: &[u8], field: &[u8]) -> Option<Bytes> {
        read(&self.hashes)
            .get(hash)
            .and_then(|fields| fields.get(field))
            .cloned()
    }

    /// Push every value in order to one end of a list, creating the list on
    /// first use. Returns the resulting length.
    pub fn push<I>(&self, key: Bytes, side: ListSide, values: I) -> usize
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut lists = write(&self.lists);
        let list = lists
            .entry(key)
            .or_insert_with(|| Quicklist::with_node_capacity(self.list_node_capacity));

        for value in values {
            match side {
                ListSide::Left => list.push_left(value),
                ListSide::Right => list.push_right(value),
            }
        }

        list.len()
    }

    /// Pop from one end of a list. An emptied list stays registered.
    pub fn pop(&self, key: &[u8], side: ListSide) -> Result<Bytes, StoreError> {
        let mut lists = write(&self.lists);
        let list = lists
            .get_mut(key)
            .ok_or_else(|| StoreError::NoSuchList(Bytes::copy_from_slice(key)))?;

        let value = match side {
            ListSide::Left => list.pop_left()?,
            ListSide::Right => list.pop_right()?,
        };
        Ok(value)
    }

    /// Length of a list, 0 when unknown
    pub fn list_len(&self, key: &[u8]) -> usize {
        read(&self.lists).get(key).map_or(0, Quicklist::len)
    }

    /// Inclusive range of a list, empty when unknown
    pub fn list_range(&self, key: &[u8], start: i64, end: i64) -> Vec<Bytes> {
        read(&self.lists)
            .get(key)
            .map(|list| list.range(start, end))
            .unwrap_or_default()
    }

    /// Element at `index`, None when the list is unknown or out of range
    pub fn list_index(&self, key: &[u8], index: i64) -> Option<Bytes> {
        read(&self.lists)
            .get(key)
            .and_then(|list| list.get(index))
            .cloned()
    }

    /// Overwrite the element at `index`
    pub fn list_set(&self, key: &[u8], index: i64, value: Bytes) -> Result<(), StoreError> {
        let mut lists = write(&self.lists);
        let list = lists
            .get_mut(key)
            .ok_or_else(|| StoreError::NoSuchList(Bytes::copy_from_slice(key)))?;

        list.set(index, value)?;
        Ok(())
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            strings: read(&self.strings).len(),
            hashes: read(&self.hashes).len(),
            lists: read(&self.lists).len(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// Poisoning is ignored, every mutation is a single map or list operation.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn b(s: &'static str) -> Bytes {
        Bytes::from(s)
    }

    #[test]
    fn test_set_last_writer_wins() {
        let engine = Engine::new();
        engine.set(b("k"), b("v1"));
        engine.set(b("k"), b("v2"));

        assert_eq!(engine.get(b"k"), Some(b("v2")));
        assert_eq!(engine.get(b"missing"), None);
    }

    #[test]
    fn test_hash_fields() {
        let engine = Engine::new();
        engine.hset(b("h"), b("f"), b("x"));

        assert_eq!(engine.hget(b"h", b"f"), Some(b("x")));
        assert_eq!(engine.hget(b"h", b"g"), None);
        assert_eq!(engine.hget(b"missing", b"f"), None);
    }

    #[test]
    fn test_push_creates_list_and_pop_keeps_it() {
        let engine = Engine::with_list_node_capacity(2);

        assert_eq!(engine.push(b("L"), ListSide::Right, vec![b("a"), b("b"), b("c")]), 3);
        assert_eq!(engine.pop(b"L", ListSide::Left), Ok(b("a")));
        assert_eq!(engine.pop(b"L", ListSide::Right), Ok(b("c")));
        assert_eq!(engine.pop(b"L", ListSide::Right), Ok(b("b")));
        assert_eq!(engine.pop(b"L", ListSide::Left), Err(StoreError::List(ListError::Empty)));

        assert_eq!(engine.stats().lists, 1);
        assert_eq!(engine.list_len(b"L"), 0);
    }

    #[test]
    fn test_pop_unknown_list() {
        let engine = Engine::new();
        assert_eq!(
            engine.pop(b"nope", ListSide::Left),
            Err(StoreError::NoSuchList(b("nope")))
        );
    }

    #[test]
    fn test_list_reads_on_unknown_key() {
        let engine = Engine::new();
        assert!(engine.list_range(b"nope", 0, -1).is_empty());
        assert_eq!(engine.list_index(b"nope", 0), None);
        assert_eq!(engine.list_len(b"nope"), 0);
    }

    #[test]
    fn test_list_set_and_index() {
        let engine = Engine::new();
        engine.push(b("L"), ListSide::Right, vec![b("a"), b("b")]);

        engine.list_set(b"L", -1, b("B")).unwrap();
        assert_eq!(engine.list_index(b"L", 1), Some(b("B")));
        assert_eq!(
            engine.list_set(b"L", 2, b("x")),
            Err(StoreError::List(ListError::IndexOutOfRange))
        );
    }

    #[test]
    fn test_concurrent_sets_leave_one_whole_value() {
        let engine = Arc::new(Engine::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let engine = engine.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        engine.set(b("shared"), Bytes::from(format!("value-{}", i)));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let value = engine.get(b"shared").unwrap();
        let written: Vec<Bytes> = (0..16).map(|i| Bytes::from(format!("value-{}", i))).collect();
        assert!(written.contains(&value));
    }
}
