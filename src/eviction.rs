//! LFU eviction bookkeeping with LRU tie-breaking.
//!
//! [`EvictionManager`] composes a [`FrequencyIndex`] (frequency → recency
//! ordered keys) and a [`KeyIndex`] (key → frequency + node handle) and keeps
//! a running minimum frequency, so that every operation is O(1):
//!
//! ```text
//!   register(k)            touch(k)                       eviction_candidate
//!   ───────────            ────────                       ──────────────────
//!   push k to front        detach k from bucket f         back of bucket min_freq
//!   of bucket 1            push k to front of f+1         (oldest among least
//!   min_freq = 1           if bucket f emptied and        frequently used)
//!                          f == min_freq:
//!                            min_freq = f+1
//! ```
//!
//! Buckets are linked to their populated neighbours, so emptying the minimum
//! bucket through `forget` or eviction advances `min_freq` to the next
//! populated frequency without a scan.
//!
//! The manager never sees values. A caller that owns a key/value map reports
//! every mutation; calls that do not match the manager's view (touching or
//! forgetting an untracked key, registering a tracked one) are no-ops that
//! emit a `tracing` warning and bump [`inconsistencies`](EvictionManager::inconsistencies).
//!
//! ## Example
//!
//! ```
//! use freqcache::eviction::EvictionManager;
//!
//! let mut lfu = EvictionManager::new();
//! lfu.register("a");
//! lfu.register("b");
//! lfu.touch(&"a");
//!
//! lfu.register("c");
//! // Three tracked keys, room for two: "b" is least frequent and older than "c".
//! assert_eq!(lfu.eviction_candidate(3, 2), Some("b"));
//! assert_eq!(lfu.eviction_candidate(2, 2), None);
//! ```

use std::borrow::Borrow;
use std::hash::Hash;

use crate::ds::frequency_index::FrequencyIndex;
use crate::ds::key_index::{KeyIndex, KeyRecord};
use crate::error::InvariantError;

/// O(1) LFU+LRU victim selection over a set of tracked keys.
#[derive(Debug)]
pub struct EvictionManager<K> {
    frequencies: FrequencyIndex<K>,
    keys: KeyIndex<K>,
    min_freq: u64,
    inconsistencies: u64,
}

impl<K> EvictionManager<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            frequencies: FrequencyIndex::new(),
            keys: KeyIndex::new(),
            min_freq: 0,
            inconsistencies: 0,
        }
    }

    /// Creates a manager with room for `capacity` tracked keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frequencies: FrequencyIndex::with_capacity(capacity),
            keys: KeyIndex::with_capacity(capacity),
            min_freq: 0,
            inconsistencies: 0,
        }
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.keys.contains(key)
    }

    /// Current touch count of `key`, if tracked.
    #[inline]
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.keys.get(key).map(|record| record.freq)
    }

    /// Lowest frequency among tracked keys.
    pub fn min_freq(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    /// Number of calls that did not match the tracked state.
    pub fn inconsistencies(&self) -> u64 {
        self.inconsistencies
    }

    /// Starts tracking `key` at frequency 1, as the most recent key.
    ///
    /// Returns `false` (and records an inconsistency) if `key` is already
    /// tracked; its frequency and position are left alone.
    pub fn register(&mut self, key: K) -> bool {
        if self.keys.contains(&key) {
            self.report_inconsistency("register");
            return false;
        }

        let above = (self.min_freq != 0).then_some(self.min_freq);
        let slot = self.frequencies.insert(1, key.clone(), None, above);
        self.keys.insert(key, KeyRecord { freq: 1, slot });
        self.min_freq = 1;
        true
    }

    /// Records an access to `key` and returns its new frequency.
    ///
    /// The key moves to the front of the next bucket up. At `u64::MAX` the
    /// count saturates and only recency is refreshed. Returns `None` (and
    /// records an inconsistency) if `key` is not tracked.
    pub fn touch<Q>(&mut self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let Some(record) = self.keys.get(key) else {
            self.report_inconsistency("touch");
            return None;
        };

        let current = record.freq;
        if current == u64::MAX {
            self.frequencies.move_to_front(current, record.slot);
            return Some(current);
        }
        let next = current + 1;

        let detached = self.frequencies.detach(current, record.slot)?;
        let below = if detached.emptied {
            detached.below
        } else {
            Some(current)
        };
        self.frequencies
            .attach(next, record.slot, below, detached.above);
        self.keys.set_freq(key, next);

        if detached.emptied && self.min_freq == current {
            self.min_freq = next;
        }
        Some(next)
    }

    /// Stops tracking `key`, returning the frequency it had.
    ///
    /// Returns `None` (and records an inconsistency) if `key` is not tracked.
    pub fn forget<Q>(&mut self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let Some(record) = self.keys.remove(key) else {
            self.report_inconsistency("forget");
            return None;
        };

        let (_, detached) = self.frequencies.remove(record.freq, record.slot)?;
        if detached.emptied && self.min_freq == record.freq {
            self.min_freq = detached.above.unwrap_or(0);
        }
        Some(record.freq)
    }

    /// Picks, untracks and returns the key to evict when `tracked_count`
    /// exceeds `capacity`.
    ///
    /// The victim is the least recently touched key of the lowest-frequency
    /// bucket. Returns `None` when there is room or nothing is tracked. The
    /// caller removes the value from its own map.
    pub fn eviction_candidate(&mut self, tracked_count: usize, capacity: usize) -> Option<K> {
        if tracked_count <= capacity || self.min_freq == 0 {
            return None;
        }

        let freq = self.min_freq;
        let slot = self.frequencies.back(freq)?;
        let (key, detached) = self.frequencies.remove(freq, slot)?;
        self.keys.remove(&key);
        if detached.emptied {
            self.min_freq = detached.above.unwrap_or(0);
        }

        tracing::debug!(
            freq,
            tracked = self.keys.len(),
            capacity,
            "evicting least frequently used key"
        );
        Some(key)
    }

    /// The key [`eviction_candidate`](Self::eviction_candidate) would pick,
    /// with its frequency, without removing it.
    pub fn peek_candidate(&self) -> Option<(&K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let slot = self.frequencies.back(self.min_freq)?;
        let key = self.frequencies.key(slot)?;
        Some((key, self.min_freq))
    }

    /// All tracked keys in the order they would be evicted.
    pub fn eviction_order(&self) -> Vec<&K> {
        let mut order = Vec::with_capacity(self.len());
        for freq in self.frequencies.frequencies_from(self.min_freq) {
            let start = order.len();
            order.extend(self.frequencies.iter_bucket(freq));
            order[start..].reverse();
        }
        order
    }

    pub fn clear(&mut self) {
        self.frequencies.clear();
        self.keys.clear();
        self.min_freq = 0;
    }

    /// Checks that the key records, the buckets and the running minimum agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.keys.len() != self.frequencies.len() {
            return Err(InvariantError::new(format!(
                "{} key records but {} bucket entries",
                self.keys.len(),
                self.frequencies.len()
            )));
        }

        if self.keys.is_empty() {
            if self.min_freq != 0 || self.frequencies.bucket_count() != 0 {
                return Err(InvariantError::new(
                    "no tracked keys but minimum frequency or buckets remain",
                ));
            }
            return Ok(());
        }

        match self.frequencies.neighbors(self.min_freq) {
            Some((None, _)) => {},
            Some((Some(below), _)) => {
                return Err(InvariantError::new(format!(
                    "minimum frequency {} has populated bucket {} below it",
                    self.min_freq, below
                )));
            },
            None => {
                return Err(InvariantError::new(format!(
                    "no bucket for minimum frequency {}",
                    self.min_freq
                )));
            },
        }

        for (key, record) in self.keys.iter() {
            if record.freq < self.min_freq || !self.frequencies.contains_bucket(record.freq) {
                return Err(InvariantError::new(format!(
                    "record at frequency {} has no matching bucket",
                    record.freq
                )));
            }
            if self.frequencies.key(record.slot) != Some(key) {
                return Err(InvariantError::new(format!(
                    "slot {} does not hold its key",
                    record.slot.index()
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("eviction invariant violated: {err}");
        }
        self.frequencies.debug_validate_invariants();
        assert_eq!(self.min_freq(), self.frequencies.lowest_by_scan());
        for (key, record) in self.keys.iter() {
            assert!(
                self.frequencies.iter_bucket(record.freq).any(|k| k == key),
                "key missing from bucket {}",
                record.freq
            );
        }
    }

    fn report_inconsistency(&mut self, operation: &'static str) {
        self.inconsistencies += 1;
        tracing::warn!(
            operation,
            tracked = self.keys.len(),
            "eviction bookkeeping does not match the store"
        );
    }
}

impl<K> Default for EvictionManager<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
