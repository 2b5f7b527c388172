//! Index-addressed node storage for the bucket lists.
//!
//! Nodes that link to each other (bucket lists in
//! [`FrequencyIndex`](crate::ds::FrequencyIndex)) refer to one another by
//! [`SlotId`] instead of by pointer. Vacant slots form a chain threaded
//! through the storage itself, so a removed node's index is the next one
//! handed out.

/// Handle to a node stored in a [`SlotArena`].
///
/// Valid until the node is removed; the index may then be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    /// Index of the next vacant slot in the chain.
    Vacant(Option<usize>),
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    next_vacant: Option<usize>,
    occupied: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            next_vacant: None,
            occupied: 0,
        }
    }

    pub fn insert(&mut self, node: T) -> SlotId {
        self.occupied += 1;
        match self.next_vacant {
            Some(idx) => {
                if let Slot::Vacant(next) = self.slots[idx] {
                    self.next_vacant = next;
                }
                self.slots[idx] = Slot::Occupied(node);
                SlotId(idx)
            },
            None => {
                self.slots.push(Slot::Occupied(node));
                SlotId(self.slots.len() - 1)
            },
        }
    }

    /// Frees `id`, returning its node. `None` if the slot is already vacant.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant(_)) {
            return None;
        }
        let Slot::Occupied(node) = std::mem::replace(slot, Slot::Vacant(self.next_vacant)) else {
            return None;
        };
        self.next_vacant = Some(id.0);
        self.occupied -= 1;
        Some(node)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant(_) => None,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_vacant = None;
        self.occupied = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slots_are_reused_most_recent_first() {
        let mut arena = SlotArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        let _c = arena.insert("c");

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.remove(b), Some("b"));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(a), None);

        assert_eq!(arena.insert("d").index(), b.index());
        assert_eq!(arena.insert("e").index(), a.index());
        assert_eq!(arena.insert("f").index(), 3);
        assert_eq!(arena.len(), 4);
    }

    #[test]
    fn removing_a_vacant_slot_is_none() {
        let mut arena = SlotArena::with_capacity(2);
        let id = arena.insert(7u32);
        assert_eq!(arena.remove(id), Some(7));
        assert_eq!(arena.remove(id), None);
        assert_eq!(arena.remove(SlotId(9)), None);
        assert!(arena.is_empty());

        // The double remove must not have pushed the slot twice.
        let first = arena.insert(1);
        let second = arena.insert(2);
        assert_ne!(first, second);
    }

    #[test]
    fn get_mut_and_clear() {
        let mut arena = SlotArena::new();
        let id = arena.insert(1);
        if let Some(node) = arena.get_mut(id) {
            *node = 10;
        }
        assert_eq!(arena.get(id), Some(&10));

        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.get(id), None);
        assert_eq!(arena.insert(5).index(), 0);
    }
}
