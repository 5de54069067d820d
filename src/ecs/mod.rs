//! Entity handles and the typed component store
//!
//! Entities are opaque generational handles; all of their meaning lives in
//! the components attached to them. The store is a set of per-type tables
//! keyed by entity, mutated only by the simulation thread between ticks.

pub mod entity;
pub mod store;

pub use entity::Entity;
pub use store::Store;
