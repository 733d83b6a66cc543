//! Specialized collection types

pub use slotmap::{new_key_type, SecondaryMap, SlotMap};

new_key_type! {
    /// Generational handle to an entity in the [`World`](crate::ecs::World)
    ///
    /// A handle whose slot has been reissued compares unequal to the new
    /// occupant, so stale references are detectable rather than aliased.
    pub struct Entity;
}

/// Map from entity handle to per-entity data
pub type EntityMap<T> = SlotMap<Entity, T>;

/// Optional per-entity component storage keyed by handle
pub type ComponentMap<T> = SecondaryMap<Entity, T>;
