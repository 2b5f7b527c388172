pub mod frequency_index;
pub mod key_index;
pub mod slot_arena;

pub use frequency_index::{DEFAULT_BUCKET_PREALLOC, Detached, FrequencyIndex};
pub use key_index::{KeyIndex, KeyRecord};
pub use slot_arena::{SlotArena, SlotId};
