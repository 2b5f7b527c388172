/// Snapshot of store-level counters.
///
/// `hits`/`misses` count [`try_get`](crate::store::CacheStore::try_get)
/// outcomes; `inserts` and `updates` split [`put`](crate::store::CacheStore::put)
/// calls by whether the key was new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub removes: u64,
    pub evictions: u64,
}

impl StoreMetrics {
    /// Fraction of lookups that hit, 0.0 when there were none.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
