//! Insertion-ordered list that holds at most one element per key.
//!
//! Elements live in an arena; `order` lists arena slots in iteration order
//! and `slots` maps each key to its slot, so duplicate detection is O(1)
//! and removal never shifts the arena.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct UniqueList<K, T> {
    arena: Vec<Option<(K, T)>>,
    order: Vec<usize>,
    slots: HashMap<K, usize>,
}

impl<K, T> Default for UniqueList<K, T> {
    fn default() -> Self {
        Self { arena: Vec::new(), order: Vec::new(), slots: HashMap::new() }
    }
}

impl<K: Eq + Hash + Clone, T> UniqueList<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless `key` is already present. Returns whether it was added.
    pub fn push(&mut self, key: K, value: T) -> bool {
        let index = self.order.len();
        self.insert(index, key, value)
    }

    /// Insert at position `index` (clamped to the length) unless `key` is present.
    pub fn insert(&mut self, index: usize, key: K, value: T) -> bool {
        if self.slots.contains_key(&key) {
            return false;
        }
        let slot = self.arena.len();
        self.arena.push(Some((key.clone(), value)));
        self.slots.insert(key, slot);
        self.order.insert(index.min(self.order.len()), slot);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.order.len() {
            return None;
        }
        let slot = self.order.remove(index);
        let (key, value) = self.arena[slot].take()?;
        self.slots.remove(&key);
        Some(value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        let slot = *self.order.get(index)?;
        self.arena[slot].as_ref().map(|(_, v)| v)
    }

    pub fn get_by_key(&self, key: &K) -> Option<&T> {
        let slot = *self.slots.get(key)?;
        self.arena[slot].as_ref().map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.order.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter().filter_map(|&slot| self.arena[slot].as_ref().map(|(k, _)| k))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|&slot| self.arena[slot].as_ref().map(|(_, v)| v))
    }

    pub fn into_vec(mut self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|&slot| self.arena[slot].take().map(|(_, v)| v))
            .collect()
    }
}

impl<K: Eq + Hash + Clone, T> Extend<(K, T)> for UniqueList<K, T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.push(key, value);
        }
    }
}

impl<K: Eq + Hash + Clone, T> FromIterator<(K, T)> for UniqueList<K, T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}
