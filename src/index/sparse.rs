//! Sparse multi-level index maps
//!
//! `BTreeMap` nesting keeps iteration deterministic. Intermediate levels are
//! created on insert and pruned as soon as they become empty, so an absent
//! key path costs nothing.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Debug;

use super::errors::{IndexError, IndexResult};

/// Two-level map: `k1 -> k2 -> value`.
#[derive(Debug, Clone)]
pub struct SparseMap2<K1, K2, V> {
    name: &'static str,
    levels: BTreeMap<K1, BTreeMap<K2, V>>,
    len: usize,
}

impl<K1, K2, V> SparseMap2<K1, K2, V>
where
    K1: Ord + Copy + Debug,
    K2: Ord + Copy + Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            levels: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert a value at a fresh key path.
    ///
    /// An occupied path is reported as `AGRO_INDEX_PATH_OCCUPIED`; the
    /// existing value is left untouched.
    pub fn insert(&mut self, k1: K1, k2: K2, value: V) -> IndexResult<()> {
        let level = self.levels.entry(k1).or_default();
        match level.entry(k2) {
            Entry::Occupied(_) => Err(IndexError::path_occupied(self.name, (k1, k2))),
            Entry::Vacant(slot) => {
                slot.insert(value);
                self.len += 1;
                Ok(())
            }
        }
    }

    /// Overwrite the value at an existing key path, returning the old one
    pub fn replace(&mut self, k1: K1, k2: K2, value: V) -> IndexResult<V> {
        match self.levels.get_mut(&k1).and_then(|level| level.get_mut(&k2)) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(IndexError::path_missing(self.name, (k1, k2))),
        }
    }

    /// Remove the leaf at a key path, pruning the outer level if emptied
    pub fn remove(&mut self, k1: K1, k2: K2) -> Option<V> {
        let level = self.levels.get_mut(&k1)?;
        let value = level.remove(&k2)?;
        if level.is_empty() {
            self.levels.remove(&k1);
        }
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, k1: K1, k2: K2) -> Option<&V> {
        self.levels.get(&k1)?.get(&k2)
    }

    /// All leaves under `k1`
    pub fn prefix(&self, k1: K1) -> Option<&BTreeMap<K2, V>> {
        self.levels.get(&k1)
    }

    /// Every `(k1, k2, value)` in key order
    pub fn iter(&self) -> impl Iterator<Item = (K1, K2, &V)> + '_ {
        self.levels
            .iter()
            .flat_map(|(k1, level)| level.iter().map(move |(k2, v)| (*k1, *k2, v)))
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of populated outer keys
    pub fn outer_len(&self) -> usize {
        self.levels.len()
    }
}

/// Three-level map: `k1 -> k2 -> k3 -> value`.
#[derive(Debug, Clone)]
pub struct SparseMap3<K1, K2, K3, V> {
    name: &'static str,
    levels: BTreeMap<K1, BTreeMap<K2, BTreeMap<K3, V>>>,
    len: usize,
}

impl<K1, K2, K3, V> SparseMap3<K1, K2, K3, V>
where
    K1: Ord + Copy + Debug,
    K2: Ord + Copy + Debug,
    K3: Ord + Copy + Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            levels: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert a value at a fresh key path; occupied paths are an error
    pub fn insert(&mut self, k1: K1, k2: K2, k3: K3, value: V) -> IndexResult<()> {
        let leaves = self.levels.entry(k1).or_default().entry(k2).or_default();
        match leaves.entry(k3) {
            Entry::Occupied(_) => Err(IndexError::path_occupied(self.name, (k1, k2, k3))),
            Entry::Vacant(slot) => {
                slot.insert(value);
                self.len += 1;
                Ok(())
            }
        }
    }

    pub fn replace(&mut self, k1: K1, k2: K2, k3: K3, value: V) -> IndexResult<V> {
        let slot = self
            .levels
            .get_mut(&k1)
            .and_then(|middle| middle.get_mut(&k2))
            .and_then(|leaves| leaves.get_mut(&k3));
        match slot {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(IndexError::path_missing(self.name, (k1, k2, k3))),
        }
    }

    /// Remove the leaf at a key path, pruning every level it empties
    pub fn remove(&mut self, k1: K1, k2: K2, k3: K3) -> Option<V> {
        let middle = self.levels.get_mut(&k1)?;
        let leaves = middle.get_mut(&k2)?;
        let value = leaves.remove(&k3)?;

        if leaves.is_empty() {
            middle.remove(&k2);
        }
        if middle.is_empty() {
            self.levels.remove(&k1);
        }
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, k1: K1, k2: K2, k3: K3) -> Option<&V> {
        self.levels.get(&k1)?.get(&k2)?.get(&k3)
    }

    pub fn prefix(&self, k1: K1) -> Option<&BTreeMap<K2, BTreeMap<K3, V>>> {
        self.levels.get(&k1)
    }

    pub fn prefix2(&self, k1: K1, k2: K2) -> Option<&BTreeMap<K3, V>> {
        self.levels.get(&k1)?.get(&k2)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K1, K2, K3, &V)> + '_ {
        self.levels.iter().flat_map(|(k1, middle)| {
            middle.iter().flat_map(move |(k2, leaves)| {
                leaves.iter().map(move |(k3, v)| (*k1, *k2, *k3, v))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn outer_len(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexErrorCode;

    #[test]
    fn test_map2_insert_and_lookup() {
        let mut map = SparseMap2::new("test");
        map.insert(1u64, 10u64, "a").unwrap();
        map.insert(1, 11, "b").unwrap();
        map.insert(2, 10, "c").unwrap();

        assert_eq!(map.get(1, 10), Some(&"a"));
        assert_eq!(map.get(3, 10), None);
        assert_eq!(map.prefix(1).unwrap().len(), 2);
        assert!(map.prefix(3).is_none());
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_map2_insert_occupied_keeps_value() {
        let mut map = SparseMap2::new("test");
        map.insert(1u64, 1u64, "first").unwrap();

        let err = map.insert(1, 1, "second").unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::AgroIndexPathOccupied);
        assert_eq!(map.get(1, 1), Some(&"first"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_map2_replace() {
        let mut map = SparseMap2::new("test");
        map.insert(1u64, 1u64, 5).unwrap();

        assert_eq!(map.replace(1, 1, 6).unwrap(), 5);
        assert_eq!(map.get(1, 1), Some(&6));

        let err = map.replace(1, 2, 7).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::AgroIndexPathMissing);
    }

    #[test]
    fn test_map2_remove_prunes_level() {
        let mut map = SparseMap2::new("test");
        map.insert(1u64, 1u64, ()).unwrap();
        map.insert(1, 2, ()).unwrap();

        assert!(map.remove(1, 1).is_some());
        assert_eq!(map.outer_len(), 1);
        assert!(map.remove(1, 2).is_some());
        assert_eq!(map.outer_len(), 0);
        assert!(map.is_empty());
        assert!(map.remove(1, 2).is_none());
    }

    #[test]
    fn test_map2_iter_in_key_order() {
        let mut map = SparseMap2::new("test");
        map.insert(2u64, 1u64, 'c').unwrap();
        map.insert(1, 2, 'b').unwrap();
        map.insert(1, 1, 'a').unwrap();

        let values: Vec<char> = map.iter().map(|(_, _, v)| *v).collect();
        assert_eq!(values, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_map3_paths() {
        let mut map = SparseMap3::new("test");
        map.insert(1u64, 2u64, 3u64, "x").unwrap();
        map.insert(1, 2, 4, "y").unwrap();
        map.insert(1, 5, 3, "z").unwrap();

        assert_eq!(map.get(1, 2, 3), Some(&"x"));
        assert_eq!(map.prefix(1).unwrap().len(), 2);
        assert_eq!(map.prefix2(1, 2).unwrap().len(), 2);
        assert!(map.prefix2(9, 2).is_none());
        assert_eq!(map.len(), 3);

        let err = map.insert(1, 2, 3, "again").unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::AgroIndexPathOccupied);
    }

    #[test]
    fn test_map3_remove_prunes_every_level() {
        let mut map = SparseMap3::new("test");
        map.insert(1u64, 2u64, 3u64, ()).unwrap();
        map.insert(1, 4, 5, ()).unwrap();

        map.remove(1, 2, 3).unwrap();
        assert!(map.prefix2(1, 2).is_none());
        assert_eq!(map.outer_len(), 1);

        map.remove(1, 4, 5).unwrap();
        assert!(map.prefix(1).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_map3_replace() {
        let mut map = SparseMap3::new("test");
        map.insert(1u64, 1u64, 1u64, 'a').unwrap();
        assert_eq!(map.replace(1, 1, 1, 'b').unwrap(), 'a');
        assert!(map.replace(1, 1, 2, 'c').is_err());
        assert_eq!(map.iter().count(), 1);
    }
}
