use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{ConfigError, InvariantError};
use crate::eviction::EvictionManager;
use crate::store::metrics::StoreMetrics;

/// In-memory key/value map with optional bounded capacity.
///
/// With a capacity, every new key beyond it evicts the least frequently used
/// key, ties going to the least recently touched. Without one, the store is a
/// plain map and no frequency bookkeeping happens at all.
///
/// # Example
///
/// ```
/// use freqcache::store::CacheStore;
///
/// let mut store = CacheStore::new(Some(2));
/// store.put("a", 1);
/// store.put("b", 2);
/// store.try_get(&"a");            // "a" now at frequency 2
///
/// let evicted = store.put("c", 3);
/// assert_eq!(evicted, Some(("b", 2)));
/// assert_eq!(store.len(), 2);
/// assert!(store.contains(&"a"));
/// assert!(store.contains(&"c"));
/// ```
#[derive(Debug)]
pub struct CacheStore<K, V> {
    entries: FxHashMap<K, V>,
    eviction: Option<EvictionManager<K>>,
    capacity: usize,
    metrics: StoreMetrics,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a store holding at most `capacity` entries.
    ///
    /// `None` and `Some(0)` both mean unlimited: no eviction, no tracking.
    pub fn new(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) if capacity > 0 => Self {
                entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
                eviction: Some(EvictionManager::with_capacity(capacity)),
                capacity,
                metrics: StoreMetrics::default(),
            },
            _ => Self::unlimited(),
        }
    }

    /// Creates a store with no capacity limit.
    pub fn unlimited() -> Self {
        Self {
            entries: FxHashMap::default(),
            eviction: None,
            capacity: 0,
            metrics: StoreMetrics::default(),
        }
    }

    /// Like [`new`](Self::new), but rejects `Some(0)` instead of treating it
    /// as unlimited.
    pub fn try_new(capacity: Option<usize>) -> Result<Self, ConfigError> {
        if capacity == Some(0) {
            return Err(ConfigError::new(
                "capacity must be > 0 (use None for an unlimited store)",
            ));
        }
        Ok(Self::new(capacity))
    }

    /// Configured capacity, `None` when unlimited.
    pub fn capacity(&self) -> Option<usize> {
        self.eviction.as_ref().map(|_| self.capacity)
    }

    /// Returns `true` when capacity mode is enabled.
    pub fn is_bounded(&self) -> bool {
        self.eviction.is_some()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys tracked by the eviction engine (0 when unlimited).
    pub fn tracked_len(&self) -> usize {
        self.eviction.as_ref().map_or(0, EvictionManager::len)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Current touch count of `key` (capacity mode only).
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.eviction.as_ref()?.frequency(key)
    }

    /// Read-only view of the eviction engine, `None` when unlimited.
    pub fn eviction(&self) -> Option<&EvictionManager<K>> {
        self.eviction.as_ref()
    }

    /// Inserts or overwrites `key`.
    ///
    /// Overwriting counts as an access. Inserting a new key into a full store
    /// first evicts one entry, which is returned. The key being inserted is
    /// never the one evicted.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            self.metrics.updates += 1;
            if let Some(eviction) = self.eviction.as_mut() {
                eviction.touch(&key);
            }
            return None;
        }

        self.metrics.inserts += 1;
        let mut evicted = None;
        if let Some(eviction) = self.eviction.as_mut() {
            let projected = eviction.len() + 1;
            if let Some(victim) = eviction.eviction_candidate(projected, self.capacity) {
                match self.entries.remove_entry(&victim) {
                    Some(entry) => {
                        self.metrics.evictions += 1;
                        evicted = Some(entry);
                    },
                    None => tracing::warn!("eviction victim had no stored value"),
                }
            }
            eviction.register(key.clone());
        }
        self.entries.insert(key, value);
        evicted
    }

    /// Looks up `key`, counting a hit as an access.
    ///
    /// A miss changes nothing but the miss counter.
    pub fn try_get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        if !self.entries.contains_key(key) {
            self.metrics.misses += 1;
            return None;
        }

        self.metrics.hits += 1;
        if let Some(eviction) = self.eviction.as_mut() {
            eviction.touch(key);
        }
        self.entries.get(key)
    }

    /// Looks up `key` without counting an access.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let value = self.entries.remove(key)?;
        self.metrics.removes += 1;
        if let Some(eviction) = self.eviction.as_mut() {
            eviction.forget(key);
        }
        Some(value)
    }

    /// Owned copy of every entry. Iteration order is unspecified.
    pub fn snapshot(&self) -> HashMap<K, V>
    where
        V: Clone,
    {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Iterates entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn metrics(&self) -> StoreMetrics {
        self.metrics
    }

    /// Bookkeeping mismatches reported by the eviction engine so far.
    pub fn inconsistencies(&self) -> u64 {
        self.eviction
            .as_ref()
            .map_or(0, EvictionManager::inconsistencies)
    }

    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(eviction) = self.eviction.as_mut() {
            eviction.clear();
        }
    }

    /// Checks that the map and the eviction engine describe the same keys.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let Some(eviction) = self.eviction.as_ref() else {
            return Ok(());
        };

        eviction.check_invariants()?;
        if self.entries.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.entries.len(),
                self.capacity
            )));
        }
        if eviction.len() != self.entries.len() {
            return Err(InvariantError::new(format!(
                "{} tracked keys but {} entries",
                eviction.len(),
                self.entries.len()
            )));
        }
        if self.entries.keys().any(|key| !eviction.contains(key)) {
            return Err(InvariantError::new("stored key is not tracked"));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("store invariant violated: {err}");
        }
        if let Some(eviction) = self.eviction.as_ref() {
            eviction.debug_validate_invariants();
        }
    }
}

impl<K, V> Default for CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted<K: Ord + Clone, V: Clone>(store: &CacheStore<K, V>) -> Vec<(K, V)>
    where
        K: Eq + Hash,
    {
        let mut entries: Vec<_> = store.snapshot().into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    #[test]
    fn cache_store_capacity_two_evicts_least_frequent() {
        let mut store = CacheStore::new(Some(2));
        store.put("a", 1);
        store.put("b", 2);
        assert_eq!(store.frequency(&"a"), Some(1));
        assert_eq!(store.frequency(&"b"), Some(1));

        assert_eq!(store.try_get(&"a"), Some(&1));
        assert_eq!(store.frequency(&"a"), Some(2));

        assert_eq!(store.put("c", 3), Some(("b", 2)));
        assert_eq!(sorted(&store), vec![("a", 1), ("c", 3)]);
        assert_eq!(store.tracked_len(), 2);
        store.debug_validate_invariants();
    }

    #[test]
    fn cache_store_capacity_one_replaces_entry() {
        let mut store = CacheStore::new(Some(1));
        store.put("x", 1);
        assert_eq!(store.put("y", 2), Some(("x", 1)));
        assert_eq!(sorted(&store), vec![("y", 2)]);
        store.debug_validate_invariants();
    }

    #[test]
    fn cache_store_new_key_never_evicts_itself() {
        let mut store = CacheStore::new(Some(1));
        store.put("x", 1);
        store.try_get(&"x");
        store.try_get(&"x");

        // "x" is at frequency 3; the incoming key must still land.
        assert_eq!(store.put("y", 2), Some(("x", 1)));
        assert!(store.contains(&"y"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.frequency(&"y"), Some(1));
        store.debug_validate_invariants();
    }

    #[test]
    fn cache_store_update_counts_as_touch() {
        let mut store = CacheStore::new(Some(2));
        store.put("a", 1);
        store.put("b", 2);
        assert_eq!(store.put("a", 10), None);
        assert_eq!(store.frequency(&"a"), Some(2));

        assert_eq!(store.put("c", 3), Some(("b", 2)));
        assert_eq!(store.peek(&"a"), Some(&10));
        assert_eq!(store.metrics().updates, 1);
        assert_eq!(store.metrics().inserts, 3);
        assert_eq!(store.metrics().evictions, 1);
    }

    #[test]
    fn cache_store_miss_has_no_side_effect() {
        let mut store = CacheStore::new(Some(2));
        store.put("a", 1);
        assert_eq!(store.try_get(&"missing"), None);
        assert_eq!(store.frequency(&"a"), Some(1));
        assert_eq!(store.tracked_len(), 1);
        assert_eq!(store.inconsistencies(), 0);
        assert_eq!(store.metrics().misses, 1);
    }

    #[test]
    fn cache_store_remove_then_get_misses() {
        let mut store = CacheStore::new(Some(3));
        store.put("a", 1);
        store.put("b", 2);
        assert_eq!(store.tracked_len(), 2);

        assert_eq!(store.remove(&"a"), Some(1));
        assert_eq!(store.tracked_len(), 1);
        assert_eq!(store.try_get(&"a"), None);
        assert_eq!(store.remove(&"a"), None);
        assert_eq!(store.tracked_len(), 1);
        assert_eq!(store.inconsistencies(), 0);
        store.debug_validate_invariants();
    }

    #[test]
    fn cache_store_peek_does_not_touch() {
        let mut store = CacheStore::new(Some(2));
        store.put("a", 1);
        store.put("b", 2);
        assert_eq!(store.peek(&"a"), Some(&1));
        assert_eq!(store.frequency(&"a"), Some(1));

        // "a" is still the oldest at frequency 1.
        assert_eq!(store.put("c", 3), Some(("a", 1)));
    }

    #[test]
    fn cache_store_unlimited_is_plain_map() {
        let mut store = CacheStore::new(None);
        for i in 0..100u32 {
            assert_eq!(store.put(i, i * 2), None);
        }
        assert_eq!(store.len(), 100);
        assert_eq!(store.tracked_len(), 0);
        assert_eq!(store.capacity(), None);
        assert!(!store.is_bounded());
        assert_eq!(store.frequency(&1), None);
        assert!(store.eviction().is_none());

        store.put(7, 0);
        assert_eq!(store.try_get(&7), Some(&0));
        assert_eq!(store.remove(&7), Some(0));
        assert_eq!(store.try_get(&7), None);
        assert_eq!(store.len(), 99);
        store.debug_validate_invariants();
    }

    #[test]
    fn cache_store_zero_capacity_means_unlimited() {
        let mut store: CacheStore<u32, u32> = CacheStore::new(Some(0));
        assert!(!store.is_bounded());
        store.put(1, 1);
        store.put(2, 2);
        assert_eq!(store.len(), 2);

        let err = CacheStore::<u32, u32>::try_new(Some(0)).unwrap_err();
        assert!(err.message().contains("capacity"));
        assert!(CacheStore::<u32, u32>::try_new(None).is_ok());
        assert_eq!(
            CacheStore::<u32, u32>::try_new(Some(3)).unwrap().capacity(),
            Some(3)
        );
    }

    #[test]
    fn cache_store_snapshot_is_independent_copy() {
        let mut store = CacheStore::new(Some(4));
        store.put("a".to_string(), "1".to_string());
        let snapshot = store.snapshot();

        store.put("a".to_string(), "2".to_string());
        store.put("b".to_string(), "3".to_string());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("a").map(String::as_str), Some("1"));
        assert_eq!(store.try_get("a").map(String::as_str), Some("2"));
    }

    #[test]
    fn cache_store_clear_resets_entries_and_tracking() {
        let mut store = CacheStore::new(Some(2));
        store.put(1u8, 'a');
        store.put(2u8, 'b');
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.tracked_len(), 0);
        store.put(3u8, 'c');
        assert_eq!(store.frequency(&3), Some(1));
        store.debug_validate_invariants();
    }

    #[test]
    fn cache_store_never_exceeds_capacity() {
        let mut store = CacheStore::new(Some(3));
        for i in 0..50u32 {
            store.put(i % 7, i);
            if i % 3 == 0 {
                store.try_get(&(i % 5));
            }
            assert!(store.len() <= 3);
            assert_eq!(store.tracked_len(), store.len());
        }
        store.debug_validate_invariants();
    }
}
