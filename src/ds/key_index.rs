//! Per-key frequency and position records.
//!
//! Each tracked key maps to a [`KeyRecord`] holding its current frequency and
//! the [`SlotId`] of its node inside the [`FrequencyIndex`]. Together they let
//! the eviction engine find and move a key between buckets without scanning.
//!
//! [`FrequencyIndex`]: crate::ds::FrequencyIndex

use std::borrow::Borrow;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::SlotId;

/// Frequency count and bucket position of a tracked key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    pub freq: u64,
    pub slot: SlotId,
}

#[derive(Debug)]
pub struct KeyIndex<K> {
    records: FxHashMap<K, KeyRecord>,
}

impl<K> KeyIndex<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            records: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.records.contains_key(key)
    }

    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<KeyRecord>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.records.get(key).copied()
    }

    /// Inserts a record, returning the previous one if `key` was present.
    pub fn insert(&mut self, key: K, record: KeyRecord) -> Option<KeyRecord> {
        self.records.insert(key, record)
    }

    /// Updates the frequency of `key`; returns `false` if missing.
    pub fn set_freq<Q>(&mut self, key: &Q, freq: u64) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.records.get_mut(key) {
            Some(record) => {
                record.freq = freq;
                true
            },
            None => false,
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<KeyRecord>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.records.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, KeyRecord)> {
        self.records.iter().map(|(key, record)| (key, *record))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<K> Default for KeyIndex<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_index_insert_get_remove() {
        let mut index = KeyIndex::new();
        let record = KeyRecord {
            freq: 1,
            slot: SlotId(0),
        };
        assert_eq!(index.insert("a".to_string(), record), None);
        assert!(index.contains("a"));
        assert_eq!(index.get("a"), Some(record));
        assert_eq!(index.len(), 1);

        assert!(index.set_freq("a", 4));
        assert_eq!(index.get("a").map(|r| r.freq), Some(4));
        assert!(!index.set_freq("missing", 2));

        assert_eq!(index.remove("a").map(|r| r.freq), Some(4));
        assert!(index.is_empty());
        assert_eq!(index.get("a"), None);
    }

    #[test]
    fn key_index_insert_replaces_record() {
        let mut index = KeyIndex::with_capacity(2);
        index.insert(1u32, KeyRecord {
            freq: 1,
            slot: SlotId(0),
        });
        let old = index.insert(1u32, KeyRecord {
            freq: 3,
            slot: SlotId(5),
        });
        assert_eq!(old.map(|r| r.freq), Some(1));
        assert_eq!(index.get(&1).map(|r| r.slot), Some(SlotId(5)));
        assert_eq!(index.iter().count(), 1);

        index.clear();
        assert!(index.is_empty());
    }
}
