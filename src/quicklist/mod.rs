//! Quicklist: a chunked doubly-linked list
//!
//! Elements live in fixed-capacity nodes chained together in both directions.
//! Nodes are stored in an arena and linked by slot index, so unlinking a node
//! is O(1) and its slot is recycled by later pushes.
//!
//! Node capacity is only enforced at push time: a node shrinks below it on
//! pops and is never compacted. A node that becomes empty is unlinked
//! immediately.

use bytes::Bytes;
use std::collections::VecDeque;
use thiserror::Error;

/// Default number of elements per node
pub const DEFAULT_NODE_CAPACITY: usize = 8;

/// Slot index of a node in the arena
type NodeId = usize;

/// Quicklist errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListError {
    /// Pop on a list with no elements
    #[error("list is empty")]
    Empty,

    /// Positional write outside of [-len, len)
    #[error("index out of range")]
    IndexOutOfRange,
}

#[derive(Debug, Default)]
struct Node {
    items: VecDeque<Bytes>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Chunked doubly-linked list of byte strings
#[derive(Debug)]
pub struct Quicklist {
    /// Node arena, vacant slots are listed in `free`
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    /// Total element count across all linked nodes
    len: usize,
    node_capacity: usize,
}

impl Quicklist {
    /// Create an empty list with the default node capacity
    pub fn new() -> Self {
        Self::with_node_capacity(DEFAULT_NODE_CAPACITY)
    }

    /// Create an empty list holding at most `capacity` elements per node
    pub fn with_node_capacity(capacity: usize) -> Self {
        Quicklist {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            node_capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    /// Number of nodes currently linked into the chain
    pub fn node_count(&self) -> usize {
        self.node_ids().count()
    }

    /// Insert at the head
    pub fn push_left(&mut self, value: Bytes) {
        match self.head {
            Some(head) if self.nodes[head].items.len() < self.node_capacity => {
                self.nodes[head].items.push_front(value);
            }
            Some(head) => {
                let id = self.alloc(value);
                self.nodes[id].next = Some(head);
                self.nodes[head].prev = Some(id);
                self.head = Some(id);
            }
            None => {
                let id = self.alloc(value);
                self.head = Some(id);
                self.tail = Some(id);
            }
        }
        self.len += 1;
    }

    /// Insert at the tail
    pub fn push_right(&mut self, value: Bytes) {
        match self.tail {
            Some(tail) if self.nodes[tail].items.len() < self.node_capacity => {
                self.nodes[tail].items.push_back(value);
            }
            Some(tail) => {
                let id = self.alloc(value);
                self.nodes[id].prev = Some(tail);
                self.nodes[tail].next = Some(id);
                self.tail = Some(id);
            }
            None => {
                let id = self.alloc(value);
                self.head = Some(id);
                self.tail = Some(id);
            }
        }
        self.len += 1;
    }

    /// Remove and return the first element
    pub fn pop_left(&mut self) -> Result<Bytes, ListError> {
        let head = self.head.ok_or(ListError::Empty)?;
        let value = self.nodes[head].items.pop_front().ok_or(ListError::Empty)?;

        if self.nodes[head].items.is_empty() {
            self.unlink(head);
        }
        self.len -= 1;
        Ok(value)
    }

    /// Remove and return the last element
    pub fn pop_right(&mut self) -> Result<Bytes, ListError> {
        let tail = self.tail.ok_or(ListError::Empty)?;
        let value = self.nodes[tail].items.pop_back().ok_or(ListError::Empty)?;

        if self.nodes[tail].items.is_empty() {
            self.unlink(tail);
        }
        self.len -= 1;
        Ok(value)
    }

    /// Element at `index`; negative indexes count from the tail
    pub fn get(&self, index: i64) -> Option<&Bytes> {
        let index = self.normalize(index)?;
        let (id, offset) = self.locate(index)?;
        self.nodes[id].items.get(offset)
    }

    /// Replace the element at `index`; negative indexes count from the tail
    pub fn set(&mut self, index: i64, value: Bytes) -> Result<(), ListError> {
        let (id, offset) = self
            .normalize(index)
            .and_then(|index| self.locate(index))
            .ok_or(ListError::IndexOutOfRange)?;

        let slot = self.nodes[id]
            .items
            .get_mut(offset)
            .ok_or(ListError::IndexOutOfRange)?;
        *slot = value;
        Ok(())
    }

    /// Elements between `start` and `end`, both inclusive
    ///
    /// Negative bounds count from the tail. A start still negative after
    /// that clamps to 0 and an end past the tail clamps to the last element.
    /// A still-negative end, `start > end` or `start >= len` yield nothing.
    pub fn range(&self, start: i64, end: i64) -> Vec<Bytes> {
        let len = self.len as i64;
        if len == 0 {
            return Vec::new();
        }

        let mut start = if start < 0 { len + start } else { start };
        let mut end = if end < 0 { len + end } else { end };

        if start < 0 {
            start = 0;
        }
        if end < 0 || start > end || start >= len {
            return Vec::new();
        }
        if end >= len {
            end = len - 1;
        }

        let (start, end) = (start as usize, end as usize);
        let mut result = Vec::with_capacity(end - start + 1);
        let mut position = 0;

        for id in self.node_ids() {
            let items = &self.nodes[id].items;
            let node_end = position + items.len();

            if node_end > start {
                let from = start.saturating_sub(position);
                let to = (end + 1 - position).min(items.len());
                result.extend(items.range(from..to).cloned());
            }

            position = node_end;
            if position > end {
                break;
            }
        }

        result
    }

    /// Iterate over every element, head to tail
    pub fn iter(&self) -> impl Iterator<Item = &Bytes> + '_ {
        self.node_ids().flat_map(move |id| self.nodes[id].items.iter())
    }

    fn normalize(&self, index: i64) -> Option<usize> {
        let len = self.len as i64;
        let index = if index < 0 { index + len } else { index };

        if index < 0 || index >= len {
            None
        } else {
            Some(index as usize)
        }
    }

    /// Walk the chain to the node holding `index`, returning the node and the
    /// offset inside it
    fn locate(&self, index: usize) -> Option<(NodeId, usize)> {
        let mut position = 0;

        for id in self.node_ids() {
            let count = self.nodes[id].items.len();
            if index < position + count {
                return Some((id, index - position));
            }
            position += count;
        }

        None
    }

    fn node_ids(&self) -> NodeIds<'_> {
        NodeIds {
            list: self,
            current: self.head,
        }
    }

    fn alloc(&mut self, value: Bytes) -> NodeId {
        let mut items = VecDeque::with_capacity(self.node_capacity);
        items.push_back(value);
        let node = Node { items, prev: None, next: None };

        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let Node { prev, next, .. } = std::mem::take(&mut self.nodes[id]);

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }

        self.free.push(id);
    }
}

impl Default for Quicklist {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over linked node slots, head to tail
struct NodeIds<'a> {
    list: &'a Quicklist,
    current: Option<NodeId>,
}

impl Iterator for NodeIds<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.list.nodes[id].next;
        Some(id)
    }
}
