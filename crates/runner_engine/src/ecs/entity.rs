//! Entity implementation

use crate::ecs::EntityTag;
use crate::foundation::math::Transform;

pub use crate::foundation::collections::Entity;

/// Per-entity data every entity carries
#[derive(Debug, Clone)]
pub struct EntityRecord {
    /// Display name, rewritten when a pooled instance is reused
    pub name: String,

    /// What kind of track content this is
    pub tag: EntityTag,

    /// World-space transform
    pub transform: Transform,

    /// Inactive entities are parked in a pool and skipped by every system
    pub active: bool,

    /// Chunk this entity is listed under, if any
    pub owner: Option<Entity>,

    /// Pool the entity was instantiated for
    pub pool_key: Option<String>,
}

impl EntityRecord {
    /// Create an inactive record at the origin
    pub fn new(name: impl Into<String>, tag: EntityTag) -> Self {
        Self {
            name: name.into(),
            tag,
            transform: Transform::identity(),
            active: false,
            owner: None,
            pool_key: None,
        }
    }
}
