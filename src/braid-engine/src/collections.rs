//! Partition-local collections keyed by a pluggable element comparer.
//!
//! Both collections are single-owner: each lives inside one partition's
//! enumerator and is never shared between workers.

use std::cmp::Ordering;
use std::sync::Arc;

use braid_core::{ElementComparer, KeyComparer};
use hashbrown::HashTable;
use hashbrown::hash_table::{Entry, IntoIter};

// ============================================================================
// ElementSet
// ============================================================================

/// Insert-if-absent set whose equality is defined by an [`ElementComparer`].
pub struct ElementSet<T> {
    table: HashTable<T>,
    comparer: Arc<dyn ElementComparer<T>>,
}

impl<T: Clone> ElementSet<T> {
    /// Create an empty set.
    pub fn new(comparer: Arc<dyn ElementComparer<T>>) -> Self {
        Self {
            table: HashTable::new(),
            comparer,
        }
    }

    /// Insert `element` unless an equal one is present.
    ///
    /// Returns `true` iff the element was absent. The stored representative
    /// is always the first one added.
    pub fn add(&mut self, element: &T) -> bool {
        let comparer = &self.comparer;
        let hash = comparer.hash(element);
        match self.table.entry(
            hash,
            |stored| comparer.equals(stored, element),
            |stored| comparer.hash(stored),
        ) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(element.clone());
                true
            }
        }
    }

    /// Whether an element equal to `element` is present.
    pub fn contains(&self, element: &T) -> bool {
        let hash = self.comparer.hash(element);
        self.table
            .find(hash, |stored| self.comparer.equals(stored, element))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

// ============================================================================
// UnionAccumulationMap
// ============================================================================

/// Map from element to the smallest ordering key seen for it.
///
/// Entries are only overwritten by a strictly smaller key, so among
/// occurrences with equal keys the first one offered wins.
pub struct UnionAccumulationMap<T, K> {
    table: HashTable<(T, K)>,
    comparer: Arc<dyn ElementComparer<T>>,
    key_comparer: Arc<dyn KeyComparer<K>>,
}

impl<T, K> UnionAccumulationMap<T, K> {
    /// Create an empty map.
    pub fn new(
        comparer: Arc<dyn ElementComparer<T>>,
        key_comparer: Arc<dyn KeyComparer<K>>,
    ) -> Self {
        Self {
            table: HashTable::new(),
            comparer,
            key_comparer,
        }
    }

    /// Record one occurrence of `element` at `key`.
    ///
    /// Returns `true` if the map changed.
    pub fn offer(&mut self, element: T, key: K) -> bool {
        let comparer = &self.comparer;
        let hash = comparer.hash(&element);
        match self.table.entry(
            hash,
            |(stored, _)| comparer.equals(stored, &element),
            |(stored, _)| comparer.hash(stored),
        ) {
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if self.key_comparer.compare(&entry.1, &key) == Ordering::Greater {
                    *entry = (element, key);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert((element, key));
                true
            }
        }
    }

    /// Key currently recorded for `element`.
    pub fn key_of(&self, element: &T) -> Option<&K> {
        let hash = self.comparer.hash(element);
        self.table
            .find(hash, |(stored, _)| self.comparer.equals(stored, element))
            .map(|(_, key)| key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Consume the map, yielding `(element, key)` pairs in unspecified order.
    pub fn into_entries(self) -> IntoIter<(T, K)> {
        self.table.into_iter()
    }
}
