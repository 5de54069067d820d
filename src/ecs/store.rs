//! Typed component store
//!
//! A mapping from (component type, entity) to component value, held as one
//! table per type. An entity has at most one component of each type;
//! insertion overwrites, and despawning an entity clears its row from every
//! table. Iteration order across entities is unspecified.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::{Entity, EntityAllocator};

/// Object-safe view of a single per-type table, used for entity-wide removal
trait Table {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedTable<T: 'static> {
    rows: HashMap<Entity, T>,
}

impl<T: 'static> TypedTable<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<T: 'static> Table for TypedTable<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.rows.remove(&entity).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The component store: entity allocator plus one table per component type
#[derive(Default)]
pub struct Store {
    allocator: EntityAllocator,
    tables: HashMap<TypeId, Box<dyn Table>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            tables: HashMap::new(),
        }
    }

    /// Create a new empty entity
    pub fn spawn(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Remove an entity and every component row it owns
    pub fn despawn(&mut self, entity: Entity) {
        if !self.allocator.deallocate(entity) {
            return;
        }
        for table in self.tables.values_mut() {
            table.remove_entity(entity);
        }
    }

    pub fn is_live(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity)
    }

    fn table<T: 'static>(&self) -> Option<&TypedTable<T>> {
        self.tables
            .get(&TypeId::of::<T>())
            .and_then(|t| t.as_any().downcast_ref::<TypedTable<T>>())
    }

    fn table_mut<T: 'static>(&mut self) -> &mut TypedTable<T> {
        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedTable::<T>::new()))
            .as_any_mut()
            .downcast_mut::<TypedTable<T>>()
            .unwrap()
    }

    /// Attach a component, replacing any existing one of the same type.
    /// Inserting onto a despawned entity is ignored.
    pub fn insert<T: 'static>(&mut self, entity: Entity, component: T) {
        if !self.allocator.is_live(entity) {
            return;
        }
        self.table_mut::<T>().rows.insert(entity, component);
    }

    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.table::<T>().and_then(|t| t.rows.get(&entity))
    }

    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        self.tables
            .get_mut(&TypeId::of::<T>())
            .and_then(|t| t.as_any_mut().downcast_mut::<TypedTable<T>>())
            .and_then(|t| t.rows.get_mut(&entity))
    }

    /// Detach and return a component (used to cascade powers across removal)
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        self.tables
            .get_mut(&TypeId::of::<T>())
            .and_then(|t| t.as_any_mut().downcast_mut::<TypedTable<T>>())
            .and_then(|t| t.rows.remove(&entity))
    }

    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// All (entity, component) pairs of a type, unordered
    pub fn iter<T: 'static>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.table::<T>()
            .into_iter()
            .flat_map(|t| t.rows.iter().map(|(e, v)| (*e, v)))
    }

    pub fn iter_mut<T: 'static>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.tables
            .get_mut(&TypeId::of::<T>())
            .and_then(|t| t.as_any_mut().downcast_mut::<TypedTable<T>>())
            .into_iter()
            .flat_map(|t| t.rows.iter_mut().map(|(e, v)| (*e, v)))
    }

    /// All entities holding a component of type T, unordered
    pub fn entities_with<T: 'static>(&self) -> Vec<Entity> {
        self.table::<T>()
            .map(|t| t.rows.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn count<T: 'static>(&self) -> usize {
        self.table::<T>().map(|t| t.rows.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Hp(u32);
    #[derive(Debug, PartialEq)]
    struct Name(&'static str);

    #[test]
    fn test_insert_get_overwrite() {
        let mut store = Store::new();
        let e = store.spawn();
        store.insert(e, Hp(3));
        assert_eq!(store.get::<Hp>(e), Some(&Hp(3)));

        // One component per type: insertion replaces
        store.insert(e, Hp(7));
        assert_eq!(store.get::<Hp>(e), Some(&Hp(7)));
        assert_eq!(store.count::<Hp>(), 1);
    }

    #[test]
    fn test_despawn_clears_all_tables() {
        let mut store = Store::new();
        let e = store.spawn();
        store.insert(e, Hp(1));
        store.insert(e, Name("peg"));
        store.despawn(e);
        assert!(store.get::<Hp>(e).is_none());
        assert!(store.get::<Name>(e).is_none());
        assert!(!store.is_live(e));
    }

    #[test]
    fn test_stale_handle_misses_after_slot_reuse() {
        let mut store = Store::new();
        let a = store.spawn();
        store.insert(a, Hp(1));
        store.despawn(a);

        let b = store.spawn();
        store.insert(b, Hp(2));
        assert_eq!(a.index(), b.index());
        // The stale handle must not see the new occupant's row
        assert!(store.get::<Hp>(a).is_none());
        assert_eq!(store.get::<Hp>(b), Some(&Hp(2)));
    }

    #[test]
    fn test_insert_on_dead_entity_ignored() {
        let mut store = Store::new();
        let e = store.spawn();
        store.despawn(e);
        store.insert(e, Hp(9));
        assert!(store.get::<Hp>(e).is_none());
        assert_eq!(store.count::<Hp>(), 0);
    }

    #[test]
    fn test_entities_with_and_take() {
        let mut store = Store::new();
        let a = store.spawn();
        let b = store.spawn();
        store.insert(a, Hp(1));
        store.insert(b, Hp(2));
        store.insert(b, Name("ball"));

        let mut with_hp = store.entities_with::<Hp>();
        with_hp.sort_by_key(|e| e.index());
        assert_eq!(with_hp, vec![a, b]);

        let taken = store.remove::<Hp>(b);
        assert_eq!(taken, Some(Hp(2)));
        assert!(store.get::<Hp>(b).is_none());
        // Other components survive a single-type removal
        assert_eq!(store.get::<Name>(b), Some(&Name("ball")));
    }
}
