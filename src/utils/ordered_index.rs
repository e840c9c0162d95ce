//! Insertion-ordered map where the first insertion of a key wins.
//!
//! Class discovery and column merging both accumulate entries while scanning
//! tables in document order. Later duplicates must never overwrite earlier
//! ones, otherwise the output would depend on which occurrence was scanned
//! last. `FirstWinsIndex` makes that rule part of the type.

use std::borrow::Borrow;
use std::hash::Hash;

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstWinsIndex<K: Hash + Eq, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Default for FirstWinsIndex<K, V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> FirstWinsIndex<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` unless `key` is already present.
    ///
    /// Returns `true` when the value was inserted.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    /// Mutable access to the entry for `key`, creating it with `default` first
    pub fn entry_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        self.entries.entry(key).or_insert_with(default)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.entries.into_values()
    }
}
