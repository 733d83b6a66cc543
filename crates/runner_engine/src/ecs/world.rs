//! ECS World implementation

use super::{Component, Entity, EntityRecord, EntityTag};
use crate::foundation::collections::{ComponentMap, EntityMap};
use crate::foundation::math::{Transform, Vec3};
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// ECS World containing all entities and components
///
/// Entities are never freed: pooled instances are created once and cycled
/// between active and inactive for the life of the world.
pub struct World {
    records: EntityMap<EntityRecord>,
    component_storages: HashMap<TypeId, Box<dyn Any>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            records: EntityMap::with_key(),
            component_storages: HashMap::new(),
        }
    }

    /// Create a new inactive entity
    pub fn create_entity(&mut self, name: impl Into<String>, tag: EntityTag) -> Entity {
        self.records.insert(EntityRecord::new(name, tag))
    }

    /// Whether the handle refers to a live entity
    pub fn contains(&self, entity: Entity) -> bool {
        self.records.contains_key(entity)
    }

    /// Number of entities ever created
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the world holds no entities
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for an entity
    pub fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        self.records.get(entity)
    }

    /// Mutable record for an entity
    pub fn record_mut(&mut self, entity: Entity) -> Option<&mut EntityRecord> {
        self.records.get_mut(entity)
    }

    /// Whether the entity exists and is active
    pub fn is_active(&self, entity: Entity) -> bool {
        self.records.get(entity).is_some_and(|record| record.active)
    }

    /// Activate or deactivate an entity
    pub fn set_active(&mut self, entity: Entity, active: bool) {
        if let Some(record) = self.records.get_mut(entity) {
            record.active = active;
        }
    }

    /// Entity tag, empty for unknown handles
    pub fn tag(&self, entity: Entity) -> EntityTag {
        self.records.get(entity).map_or(EntityTag::empty(), |record| record.tag)
    }

    /// World-space transform
    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.records.get(entity).map(|record| &record.transform)
    }

    /// Mutable world-space transform
    pub fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform> {
        self.records.get_mut(entity).map(|record| &mut record.transform)
    }

    /// World-space position
    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.transform(entity).map(|transform| transform.position)
    }

    /// Move an entity by `offset`
    pub fn translate(&mut self, entity: Entity, offset: Vec3) {
        if let Some(transform) = self.transform_mut(entity) {
            transform.translate(offset);
        }
    }

    /// Owning chunk of an entity
    pub fn owner(&self, entity: Entity) -> Option<Entity> {
        self.records.get(entity).and_then(|record| record.owner)
    }

    /// Set or clear the owning chunk of an entity
    pub fn set_owner(&mut self, entity: Entity, owner: Option<Entity>) {
        if let Some(record) = self.records.get_mut(entity) {
            record.owner = owner;
        }
    }

    /// Pool key an entity was instantiated for
    pub fn pool_key(&self, entity: Entity) -> Option<&str> {
        self.records.get(entity).and_then(|record| record.pool_key.as_deref())
    }

    /// Rename an entity
    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) {
        if let Some(record) = self.records.get_mut(entity) {
            record.name = name.into();
        }
    }

    /// Entity name
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.records.get(entity).map(|record| record.name.as_str())
    }

    /// Active entities whose tag intersects `mask`
    pub fn active_with_tag(&self, mask: EntityTag) -> impl Iterator<Item = Entity> + '_ {
        self.records
            .iter()
            .filter(move |(_, record)| record.active && record.tag.intersects(mask))
            .map(|(entity, _)| entity)
    }

    /// Add a component to an entity, replacing any previous value
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        if !self.records.contains_key(entity) {
            log::warn!("Ignoring component for unknown entity {:?}", entity);
            return;
        }
        self.storage_mut::<T>().insert(entity, component);
    }

    /// Remove a component from an entity
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .downcast_mut::<ComponentMap<T>>()?
            .remove(entity)
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.component_storages
            .get(&TypeId::of::<T>())?
            .downcast_ref::<ComponentMap<T>>()?
            .get(entity)
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .downcast_mut::<ComponentMap<T>>()?
            .get_mut(entity)
    }

    /// Whether an entity has a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity).is_some()
    }

    fn storage_mut<T: Component>(&mut self) -> &mut ComponentMap<T> {
        self.component_storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentMap::<T>::new()))
            .downcast_mut::<ComponentMap<T>>()
            .unwrap_or_else(|| unreachable!("component storage keyed by its own TypeId"))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
