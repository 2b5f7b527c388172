pub use crate::ds::{FrequencyIndex, KeyIndex, KeyRecord, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError, OpLogError};
pub use crate::eviction::EvictionManager;
pub use crate::oplog::{Operation, ReplayStats, parse_line, parse_log, replay};
pub use crate::snapshot::SnapshotDiff;
pub use crate::store::{CacheStore, StoreMetrics};
pub use crate::workload::{OperationGenerator, OperationMix, WorkloadConfig};
