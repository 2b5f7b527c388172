//! Frequency buckets with recency order inside each bucket.
//!
//! Maps a frequency count to the keys currently sharing it. Each bucket is a
//! doubly-linked list of arena nodes (front = most recently touched, back =
//! least recently touched), and buckets are themselves linked to their
//! populated neighbours in ascending frequency order.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                       FrequencyIndex<K> Layout                        │
//! │                                                                       │
//! │   buckets: FxHashMap<u64, Bucket>        nodes: SlotArena<Node<K>>    │
//! │                                                                       │
//! │   freq=1 ◄──► freq=3 ◄──► freq=7         ┌──────┬────────────────┐   │
//! │     │           │           │            │ Slot │ Node           │   │
//! │     ▼           ▼           ▼            ├──────┼────────────────┤   │
//! │   head ──► "c" ──► "a" ──► tail          │ id_0 │ "a" prev/next  │   │
//! │   (MRU)                   (LRU)          │ id_1 │ "b" prev/next  │   │
//! │                                          │ id_2 │ "c" prev/next  │   │
//! │                                          └──────┴────────────────┘   │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index does not know which key lives at which frequency; callers keep
//! the `(freq, SlotId)` pair (see [`KeyIndex`](crate::ds::KeyIndex)) and pass
//! it back for O(1) detach and move.
//!
//! Creating a bucket needs its populated neighbours (`below`, `above`). The
//! caller supplies them: they are either the bucket a node just left, or the
//! current minimum when bucket 1 is created. In exchange, [`detach`] reports
//! the neighbourhood of the bucket a node left, which is all a caller needs to
//! maintain a running minimum without scanning.
//!
//! ## Operations
//!
//! | Operation       | Time | Notes                                       |
//! |-----------------|------|---------------------------------------------|
//! | `insert`        | O(1) | Allocate node, push to front of bucket      |
//! | `attach`        | O(1) | Push existing node to front of bucket       |
//! | `detach`        | O(1) | Unlink node; drop bucket if it empties      |
//! | `remove`        | O(1) | Detach and free the node                    |
//! | `move_to_front` | O(1) | Refresh recency without changing bucket     |
//! | `back`          | O(1) | LRU node of a bucket                        |
//!
//! [`detach`]: FrequencyIndex::detach

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Default bucket pre-allocation. Most keys sit at low frequencies.
pub const DEFAULT_BUCKET_PREALLOC: usize = 32;

#[derive(Debug)]
struct Node<K> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    key: K,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
    below: Option<u64>,
    above: Option<u64>,
}

/// Neighbourhood of the bucket a node was detached from.
///
/// `below` and `above` are the populated frequencies adjacent to that bucket
/// at the time of the detach. When `emptied` is set the bucket is gone and its
/// two neighbours now link to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detached {
    pub emptied: bool,
    pub below: Option<u64>,
    pub above: Option<u64>,
}

/// Frequency → recency-ordered bucket of keys.
#[derive(Debug)]
pub struct FrequencyIndex<K> {
    nodes: SlotArena<Node<K>>,
    buckets: FxHashMap<u64, Bucket>,
}

impl<K> FrequencyIndex<K> {
    pub fn new() -> Self {
        Self {
            nodes: SlotArena::new(),
            buckets: FxHashMap::default(),
        }
    }

    /// Creates an empty index with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            buckets: FxHashMap::with_capacity_and_hasher(
                DEFAULT_BUCKET_PREALLOC,
                Default::default(),
            ),
        }
    }

    /// Number of keys across all buckets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of populated buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn contains_bucket(&self, freq: u64) -> bool {
        self.buckets.contains_key(&freq)
    }

    /// Populated neighbours `(below, above)` of the bucket for `freq`.
    pub fn neighbors(&self, freq: u64) -> Option<(Option<u64>, Option<u64>)> {
        self.buckets
            .get(&freq)
            .map(|bucket| (bucket.below, bucket.above))
    }

    pub fn key(&self, id: SlotId) -> Option<&K> {
        self.nodes.get(id).map(|node| &node.key)
    }

    /// Most recently touched node of the bucket for `freq`.
    pub fn front(&self, freq: u64) -> Option<SlotId> {
        self.buckets.get(&freq)?.head
    }

    /// Least recently touched node of the bucket for `freq`.
    pub fn back(&self, freq: u64) -> Option<SlotId> {
        self.buckets.get(&freq)?.tail
    }

    /// Iterates the keys of one bucket from front (MRU) to back (LRU).
    pub fn iter_bucket(&self, freq: u64) -> BucketIter<'_, K> {
        BucketIter {
            index: self,
            current: self.front(freq),
        }
    }

    /// Iterates populated frequencies in ascending order, starting at `freq`.
    ///
    /// Yields nothing if `freq` has no bucket.
    pub fn frequencies_from(&self, freq: u64) -> FrequencyIter<'_, K> {
        let current = self.contains_bucket(freq).then_some(freq);
        FrequencyIter {
            index: self,
            current,
        }
    }

    /// Allocates a node for `key` and pushes it to the front of `freq`.
    ///
    /// `below`/`above` are only used when the bucket does not exist yet.
    pub fn insert(&mut self, freq: u64, key: K, below: Option<u64>, above: Option<u64>) -> SlotId {
        let id = self.nodes.insert(Node {
            prev: None,
            next: None,
            key,
        });
        self.attach(freq, id, below, above);
        id
    }

    /// Pushes a detached node to the front of `freq`, creating the bucket
    /// between `below` and `above` if needed.
    pub fn attach(&mut self, freq: u64, id: SlotId, below: Option<u64>, above: Option<u64>) {
        if !self.buckets.contains_key(&freq) {
            self.link_bucket(freq, below, above);
        }
        self.push_front(freq, id);
    }

    /// Unlinks `id` from the bucket for `freq`, keeping the node allocated.
    ///
    /// Returns `None` if the bucket or node does not exist.
    pub fn detach(&mut self, freq: u64, id: SlotId) -> Option<Detached> {
        self.unlink(freq, id)?;
        let bucket = self.buckets.get(&freq)?;
        let detached = Detached {
            emptied: bucket.len == 0,
            below: bucket.below,
            above: bucket.above,
        };
        if detached.emptied {
            self.unlink_bucket(freq, detached.below, detached.above);
        }
        Some(detached)
    }

    /// Detaches `id` and frees its node, returning the key.
    pub fn remove(&mut self, freq: u64, id: SlotId) -> Option<(K, Detached)> {
        let detached = self.detach(freq, id)?;
        let node = self.nodes.remove(id)?;
        Some((node.key, detached))
    }

    /// Moves `id` to the front of its bucket.
    pub fn move_to_front(&mut self, freq: u64, id: SlotId) -> bool {
        if self.unlink(freq, id).is_none() {
            return false;
        }
        self.push_front(freq, id);
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.clear();
    }

    /// Lowest populated frequency, found by scanning every bucket.
    ///
    /// Reference for checking a running minimum; O(buckets).
    #[cfg(any(test, debug_assertions))]
    pub fn lowest_by_scan(&self) -> Option<u64> {
        self.buckets.keys().copied().min()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut seen = 0usize;
        let mut chain_heads = 0usize;

        for (&freq, bucket) in &self.buckets {
            assert!(freq > 0, "bucket for frequency 0");
            assert!(bucket.len > 0, "empty bucket {freq}");
            assert!(bucket.head.is_some());
            assert!(bucket.tail.is_some());

            match bucket.below {
                Some(below) => {
                    assert!(below < freq);
                    assert_eq!(self.buckets[&below].above, Some(freq));
                },
                None => chain_heads += 1,
            }
            if let Some(above) = bucket.above {
                assert!(above > freq);
                assert_eq!(self.buckets[&above].below, Some(freq));
            }

            let mut current = bucket.head;
            let mut last = None;
            let mut count = 0usize;
            while let Some(id) = current {
                let node = self.nodes.get(id).expect("bucket node missing");
                assert_eq!(node.prev, last);
                last = Some(id);
                current = node.next;
                count += 1;
            }
            assert_eq!(bucket.tail, last);
            assert_eq!(bucket.len, count);
            seen += count;
        }

        assert_eq!(seen, self.nodes.len(), "nodes outside any bucket");
        if self.buckets.is_empty() {
            assert_eq!(chain_heads, 0);
        } else {
            assert_eq!(chain_heads, 1, "bucket chain is split");
        }
    }

    fn link_bucket(&mut self, freq: u64, below: Option<u64>, above: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                below,
                above,
                ..Bucket::default()
            },
        );

        if let Some(below) = below
            && let Some(bucket) = self.buckets.get_mut(&below)
        {
            bucket.above = Some(freq);
        }
        if let Some(above) = above
            && let Some(bucket) = self.buckets.get_mut(&above)
        {
            bucket.below = Some(freq);
        }
    }

    fn unlink_bucket(&mut self, freq: u64, below: Option<u64>, above: Option<u64>) {
        if let Some(below) = below
            && let Some(bucket) = self.buckets.get_mut(&below)
        {
            bucket.above = above;
        }
        if let Some(above) = above
            && let Some(bucket) = self.buckets.get_mut(&above)
        {
            bucket.below = below;
        }
        self.buckets.remove(&freq);
    }

    fn push_front(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };

        let old_head = bucket.head;
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(old_head) = old_head {
            if let Some(node) = self.nodes.get_mut(old_head) {
                node.prev = Some(id);
            }
        } else {
            bucket.tail = Some(id);
        }
        bucket.head = Some(id);
        bucket.len += 1;
    }

    fn unlink(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.nodes.get(id)?;
            (node.prev, node.next)
        };

        let bucket = self.buckets.get_mut(&freq)?;
        if let Some(prev) = prev {
            if let Some(node) = self.nodes.get_mut(prev) {
                node.next = next;
            }
        } else {
            bucket.head = next;
        }
        if let Some(next) = next {
            if let Some(node) = self.nodes.get_mut(next) {
                node.prev = prev;
            }
        } else {
            bucket.tail = prev;
        }
        bucket.len = bucket.len.saturating_sub(1);

        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = None;
            node.next = None;
        }
        Some(())
    }
}

impl<K> Default for FrequencyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the keys of one bucket, front (MRU) to back (LRU).
pub struct BucketIter<'a, K> {
    index: &'a FrequencyIndex<K>,
    current: Option<SlotId>,
}

impl<'a, K> Iterator for BucketIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.index.nodes.get(id)?;
        self.current = node.next;
        Some(&node.key)
    }
}

/// Iterator over populated frequencies in ascending order.
pub struct FrequencyIter<'a, K> {
    index: &'a FrequencyIndex<K>,
    current: Option<u64>,
}

impl<K> Iterator for FrequencyIter<'_, K> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        let freq = self.current?;
        self.current = self.index.buckets.get(&freq).and_then(|b| b.above);
        Some(freq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<K: Clone>(index: &FrequencyIndex<K>, freq: u64) -> Vec<K> {
        index.iter_bucket(freq).cloned().collect()
    }

    #[test]
    fn frequency_index_push_front_orders_by_recency() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(1, "a", None, None);
        index.insert(1, "b", None, None);
        index.insert(1, "c", None, None);

        assert_eq!(keys(&index, 1), vec!["c", "b", "a"]);
        assert_eq!(index.back(1), Some(a));
        assert_eq!(keys(&index, 1).len(), 3);
        assert_eq!(index.len(), 3);
        index.debug_validate_invariants();
    }

    #[test]
    fn frequency_index_detach_reports_neighbors() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(1, "a", None, None);
        index.insert(3, "b", Some(1), None);
        index.insert(7, "c", Some(3), None);
        assert_eq!(index.neighbors(3), Some((Some(1), Some(7))));

        let b = index.front(3).unwrap();
        let detached = index.detach(3, b).unwrap();
        assert_eq!(
            detached,
            Detached {
                emptied: true,
                below: Some(1),
                above: Some(7),
            }
        );
        assert!(!index.contains_bucket(3));
        assert_eq!(index.neighbors(1), Some((None, Some(7))));
        assert_eq!(index.neighbors(7), Some((Some(1), None)));

        // Node is still allocated and can be re-attached elsewhere.
        index.attach(4, b, Some(1), Some(7));
        assert_eq!(keys(&index, 4), vec!["b"]);
        assert_eq!(index.frequencies_from(1).collect::<Vec<_>>(), vec![1, 4, 7]);

        let (key, detached) = index.remove(1, a).unwrap();
        assert_eq!(key, "a");
        assert!(detached.emptied);
        assert_eq!(detached.above, Some(4));
        index.debug_validate_invariants();
    }

    #[test]
    fn frequency_index_detach_keeps_populated_bucket() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(2, "a", None, None);
        index.insert(2, "b", None, None);

        let detached = index.detach(2, a).unwrap();
        assert!(!detached.emptied);
        assert_eq!(keys(&index, 2).len(), 1);
        assert_eq!(keys(&index, 2), vec!["b"]);
        // Detached node still counts as allocated until freed.
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn frequency_index_move_to_front_refreshes_recency() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(1, "a", None, None);
        index.insert(1, "b", None, None);
        assert_eq!(keys(&index, 1), vec!["b", "a"]);

        assert!(index.move_to_front(1, a));
        assert_eq!(keys(&index, 1), vec!["a", "b"]);
        assert_eq!(keys(&index, 1).len(), 2);
        index.debug_validate_invariants();
    }

    #[test]
    fn frequency_index_lowest_by_scan_follows_buckets() {
        let mut index: FrequencyIndex<&str> = FrequencyIndex::new();
        assert_eq!(index.lowest_by_scan(), None);

        let a = index.insert(5, "a", None, None);
        index.insert(9, "b", Some(5), None);
        assert_eq!(index.lowest_by_scan(), Some(5));

        index.remove(5, a);
        assert_eq!(index.lowest_by_scan(), Some(9));
    }

    #[test]
    fn frequency_index_missing_bucket_or_node() {
        let mut index: FrequencyIndex<&str> = FrequencyIndex::new();
        let a = index.insert(1, "a", None, None);
        assert_eq!(index.detach(2, a), None);
        assert_eq!(index.back(2), None);
        assert_eq!(index.frequencies_from(2).count(), 0);

        index.remove(1, a);
        assert_eq!(index.remove(1, a), None);
        assert!(!index.move_to_front(1, a));
        assert!(index.is_empty());
        assert_eq!(index.bucket_count(), 0);
    }
}
