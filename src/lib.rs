//! freqcache: in-memory key/value cache with O(1) LFU eviction.
//!
//! Eviction picks the least frequently used key, and among keys sharing that
//! frequency the least recently touched one. The bookkeeping lives in
//! [`eviction::EvictionManager`]; [`store::CacheStore`] pairs it with the
//! key/value map. The remaining modules are tooling around the store:
//! operation logs, random workloads and snapshot files.
//!
//! ```
//! use freqcache::prelude::*;
//!
//! let mut store = CacheStore::new(Some(2));
//! store.put("a", 1);
//! store.put("b", 2);
//! store.try_get(&"a");
//! store.put("c", 3);
//!
//! assert!(!store.contains(&"b"));
//! ```

pub mod ds;
pub mod error;
pub mod eviction;
pub mod oplog;
pub mod prelude;
pub mod snapshot;
pub mod store;
pub mod workload;
