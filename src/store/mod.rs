//! Key/value storage with optional LFU eviction.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        CacheStore<K, V>                          │
//!   │                                                                  │
//!   │   entries: FxHashMap<K, V>        (values live here)             │
//!   │                                                                  │
//!   │   eviction: Option<EvictionManager<K>>                           │
//!   │     None     → unlimited: plain map semantics                    │
//!   │     Some(..) → capacity mode: keys only, LFU + LRU tie-break     │
//!   │                                                                  │
//!   │   put(new key)      → eviction_candidate → remove victim         │
//!   │                       → insert → register                        │
//!   │   put(existing key) → overwrite → touch                          │
//!   │   try_get(hit)      → touch                                      │
//!   │   remove            → forget                                     │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`CacheStore`]: the store itself.
//! - [`StoreMetrics`]: hit/miss/insert/update/remove/eviction counters.
//!
//! ## Thread Safety
//!
//! Not thread-safe. Wrap in a lock for shared access.

mod cache_store;
mod metrics;

pub use cache_store::CacheStore;
pub use metrics::StoreMetrics;
