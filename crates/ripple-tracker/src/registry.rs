#![forbid(unsafe_code)]

//! Child registry: a node's store of owned descendant nodes.
//!
//! Keys are member names for property children and [`ObjectId`]s for
//! collection children. Each entry owns the child node, the relay
//! subscription that bubbles the child's signal to its parent, and an
//! occurrence count.
//!
//! # Invariants
//!
//! 1. An entry exists iff its occurrence count is at least one.
//! 2. Nodes leave the registry only by being returned to the caller, who is
//!    responsible for releasing them after dropping any borrow of the registry.
//!    The relay subscription is dropped together with the entry.
//!
//! [`ObjectId`]: ripple_core::ObjectId

use std::hash::Hash;

use ahash::AHashMap;
use ripple_core::Subscription;

struct ChildEntry<N> {
    node: N,
    occurrences: usize,
    _relay: Subscription,
}

pub(crate) struct ChildRegistry<K, N> {
    entries: AHashMap<K, ChildEntry<N>>,
}

impl<K: Hash + Eq + Copy, N> ChildRegistry<K, N> {
    pub(crate) fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count one more occurrence of an existing entry and return the new
    /// count. `None` means there is no entry and the caller must create one.
    pub(crate) fn add_occurrence(&mut self, key: &K) -> Option<usize> {
        let entry = self.entries.get_mut(key)?;
        entry.occurrences += 1;
        Some(entry.occurrences)
    }

    /// Store a freshly registered child with one occurrence. A displaced
    /// entry's node is handed back for release.
    pub(crate) fn insert(&mut self, key: K, node: N, relay: Subscription) -> Option<N> {
        self.entries
            .insert(
                key,
                ChildEntry {
                    node,
                    occurrences: 1,
                    _relay: relay,
                },
            )
            .map(|displaced| displaced.node)
    }

    /// Drop one occurrence. Returns the node once the count reaches zero.
    pub(crate) fn remove_occurrence(&mut self, key: &K) -> Option<N> {
        let entry = self.entries.get_mut(key)?;
        entry.occurrences = entry.occurrences.saturating_sub(1);
        if entry.occurrences > 0 {
            return None;
        }
        self.entries.remove(key).map(|e| e.node)
    }

    /// Remove an entry regardless of its count.
    pub(crate) fn remove(&mut self, key: &K) -> Option<N> {
        self.entries.remove(key).map(|e| e.node)
    }

    /// Empty the registry, handing back every node.
    pub(crate) fn drain(&mut self) -> Vec<N> {
        self.entries.drain().map(|(_, e)| e.node).collect()
    }
}
