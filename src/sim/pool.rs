//! Fixed-capacity entity pools
//!
//! Every pooled entity (bullets, enemies, life markers, kill effects) lives
//! in a slot that is allocated once and then toggled between active and
//! inactive. Acquiring never grows the pool.

use serde::{Deserialize, Serialize};

/// Stable index of a slot inside a [`Pool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl SlotId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single pool slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot<T> {
    pub active: bool,
    pub item: T,
}

/// Arena of pre-allocated slots with an active/inactive tag each
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
}

impl<T: Default> Pool<T> {
    /// Allocate `capacity` inactive slots up front
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                active: false,
                item: T::default(),
            })
            .collect();
        Self { slots }
    }
}

impl<T> Pool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// First inactive slot, or `None` when the pool is exhausted
    pub fn acquire_inactive(&self) -> Option<SlotId> {
        self.slots
            .iter()
            .position(|s| !s.active)
            .map(|i| SlotId(i as u32))
    }

    /// Store `item` in slot `id` and mark it active
    pub fn activate(&mut self, id: SlotId, item: T) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            slot.item = item;
            slot.active = true;
        }
    }

    /// Acquire the first inactive slot and activate it with `item`
    pub fn spawn(&mut self, item: T) -> Option<SlotId> {
        let id = self.acquire_inactive()?;
        self.activate(id, item);
        Some(id)
    }

    /// Mark a slot inactive. Returns true if it was active.
    pub fn deactivate(&mut self, id: SlotId) -> bool {
        match self.slots.get_mut(id.index()) {
            Some(slot) if slot.active => {
                slot.active = false;
                true
            }
            _ => false,
        }
    }

    pub fn deactivate_all(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
    }

    /// Re-activate every slot, keeping whatever item it last held
    pub fn revive_all(&mut self) {
        for slot in &mut self.slots {
            slot.active = true;
        }
    }

    #[inline]
    pub fn is_active(&self, id: SlotId) -> bool {
        self.slots.get(id.index()).is_some_and(|s| s.active)
    }

    pub fn count_active(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    pub fn first_active(&self) -> Option<SlotId> {
        self.slots
            .iter()
            .position(|s| s.active)
            .map(|i| SlotId(i as u32))
    }

    /// Item in an active slot
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|s| s.active)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .filter(|s| s.active)
            .map(|s| &mut s.item)
    }

    /// Iterate active slots in index order
    pub fn iter_active(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (SlotId(i as u32), &s.item))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (SlotId(i as u32), &mut s.item))
    }

    /// Snapshot of active slot ids (for loops that mutate the pool)
    pub fn active_ids(&self) -> Vec<SlotId> {
        self.iter_active().map(|(id, _)| id).collect()
    }

    /// Deactivate every active slot for which `f` returns false
    pub fn retain_active(&mut self, mut f: impl FnMut(&T) -> bool) {
        for slot in &mut self.slots {
            if slot.active && !f(&slot.item) {
                slot.active = false;
            }
        }
    }
}
