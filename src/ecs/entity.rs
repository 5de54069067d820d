//! Generational entity handles
//!
//! An entity is an index into the allocator's slot list plus the generation
//! that slot had when the handle was issued. Despawning a slot bumps its
//! generation, so stale handles held elsewhere simply stop matching instead
//! of aliasing whatever reuses the slot.

use serde::{Deserialize, Serialize};

/// An opaque entity identity. Two live handles are equal iff they refer to
/// the same allocation; a handle to a despawned entity compares unequal to
/// every live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Rebuild a handle from raw parts (snapshots, probe bodies)
    pub fn from_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Allocates and recycles entity slots
#[derive(Debug, Default, Clone)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    /// Slot indices free for reuse
    free: Vec<u32>,
    /// Live flags parallel to `generations`
    live: Vec<bool>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh entity, reusing a despawned slot when one exists
    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free.pop() {
            self.live[index as usize] = true;
            Entity {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.live.push(true);
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Release an entity's slot. Returns false for stale or unknown handles.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        let i = entity.index as usize;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.live[i] = false;
        self.free.push(entity.index);
        true
    }

    /// Whether the handle refers to a currently-allocated entity
    pub fn is_live(&self, entity: Entity) -> bool {
        let i = entity.index as usize;
        i < self.generations.len() && self.live[i] && self.generations[i] == entity.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_distinct() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
        assert!(alloc.is_live(a));
        assert!(alloc.is_live(b));
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.deallocate(a));
        assert!(!alloc.is_live(a));

        // Slot is reused with a bumped generation
        let b = alloc.allocate();
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(!alloc.is_live(a));
        assert!(alloc.is_live(b));
    }

    #[test]
    fn test_double_deallocate_is_noop() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.deallocate(a));
        assert!(!alloc.deallocate(a));
    }
}
