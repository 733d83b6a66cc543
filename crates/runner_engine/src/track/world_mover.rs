//! World mover
//!
//! Translates every registered entity backward along the forward axis once
//! per frame. Chunks and their children are registered individually and all
//! receive the same offset, which produces forward travel while the player
//! stays near the origin.
//!
//! Entities that go inactive without being unregistered are not an error:
//! they stay listed until the next [`update`](WorldMover::update) sweep,
//! which drops them before translating. Expect one frame of lag between a
//! deactivation and the registry noticing it.

use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;
use std::collections::HashSet;

/// Result of the last sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoverStats {
    /// Entities translated
    pub translated: usize,
    /// Inactive entities dropped from the registry
    pub purged: usize,
}

/// Registry of entities translated every frame
#[derive(Debug)]
pub struct WorldMover {
    registry: Vec<Entity>,
    members: HashSet<Entity>,
    speed: f32,
    forward_axis: Vec3,
    last: MoverStats,
}

impl WorldMover {
    /// Create an empty mover
    ///
    /// A zero `forward_axis` falls back to +Z.
    pub fn new(speed: f32, forward_axis: Vec3) -> Self {
        let forward_axis = forward_axis.try_normalize(f32::EPSILON).unwrap_or_else(|| {
            log::warn!("Zero forward axis for world mover; using +Z");
            Vec3::z()
        });
        Self {
            registry: Vec::new(),
            members: HashSet::new(),
            speed,
            forward_axis,
            last: MoverStats::default(),
        }
    }

    /// Add an entity; returns `false` if it was already registered
    pub fn register(&mut self, entity: Entity) -> bool {
        if !self.members.insert(entity) {
            return false;
        }
        self.registry.push(entity);
        true
    }

    /// Remove an entity; returns `false` if it was not registered
    pub fn unregister(&mut self, entity: Entity) -> bool {
        if !self.members.remove(&entity) {
            return false;
        }
        self.registry.retain(|registered| *registered != entity);
        true
    }

    /// Whether an entity is registered
    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Registered entities in registration order
    pub fn registered(&self) -> &[Entity] {
        &self.registry
    }

    /// Travel speed in units per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the travel speed
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Unit direction of travel
    pub fn forward_axis(&self) -> Vec3 {
        self.forward_axis
    }

    /// Result of the last sweep
    pub fn last_stats(&self) -> MoverStats {
        self.last
    }

    /// Forget every registered entity
    pub fn clear(&mut self) {
        self.registry.clear();
        self.members.clear();
    }

    /// Purge inactive entries, then translate the rest by `-axis * speed * dt`
    pub fn update(&mut self, world: &mut World, delta_time: f32) -> MoverStats {
        let before = self.registry.len();
        let members = &mut self.members;
        self.registry.retain(|entity| {
            let keep = world.is_active(*entity);
            if !keep {
                members.remove(entity);
            }
            keep
        });
        let purged = before - self.registry.len();

        let offset = -self.forward_axis * (self.speed * delta_time);
        for entity in &self.registry {
            world.translate(*entity, offset);
        }

        self.last = MoverStats {
            translated: self.registry.len(),
            purged,
        };
        if purged > 0 {
            log::trace!("World mover purged {} inactive entities", purged);
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityTag;
    use approx::assert_relative_eq;

    fn active(world: &mut World, name: &str) -> Entity {
        let entity = world.create_entity(name, EntityTag::OBSTACLE);
        world.set_active(entity, true);
        entity
    }

    #[test]
    fn test_register_is_a_set() {
        let mut world = World::new();
        let rock = active(&mut world, "Rock");
        let mut mover = WorldMover::new(10.0, Vec3::z());

        assert!(mover.register(rock));
        assert!(!mover.register(rock));
        assert_eq!(mover.len(), 1);

        assert!(mover.unregister(rock));
        assert!(!mover.unregister(rock));
        assert!(mover.is_empty());
    }

    #[test]
    fn test_update_translates_backward() {
        let mut world = World::new();
        let rock = active(&mut world, "Rock");
        let mut mover = WorldMover::new(20.0, Vec3::new(0.0, 0.0, 2.0));
        mover.register(rock);

        let stats = mover.update(&mut world, 0.5);

        assert_eq!(stats, MoverStats { translated: 1, purged: 0 });
        assert_relative_eq!(world.position(rock).expect("position"), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_inactive_entities_are_purged_on_next_sweep() {
        let mut world = World::new();
        let rock = active(&mut world, "Rock");
        let tree = active(&mut world, "Tree");
        let mut mover = WorldMover::new(1.0, Vec3::z());
        mover.register(rock);
        mover.register(tree);

        world.set_active(rock, false);
        // Still listed until the sweep runs
        assert!(mover.contains(rock));

        let stats = mover.update(&mut world, 1.0);
        assert_eq!(stats.purged, 1);
        assert!(!mover.contains(rock));
        assert_eq!(mover.registered(), &[tree]);
        assert_relative_eq!(world.position(rock).expect("position"), Vec3::zeros());

        // Re-registering after reuse works
        world.set_active(rock, true);
        assert!(mover.register(rock));
    }

    #[test]
    fn test_zero_axis_falls_back_to_z() {
        let mover = WorldMover::new(1.0, Vec3::zeros());
        assert_relative_eq!(mover.forward_axis(), Vec3::z());
    }
}
