//! Despawn zone
//!
//! A thin slab across the track a fixed distance behind the player. Overlap
//! is tracked from frame to frame and turned into enter and exit edges:
//!
//! - an obstacle or pickup entering the slab goes straight back to its pool
//! - a terrain chunk leaving the slab advances the chunk window
//!
//! Chunks overlap the slab over their whole `start..end` Z extent, so a
//! chunk only exits once it is entirely behind the zone.

use super::chunk::{self, TerrainChunk};
use super::{AdvanceReport, ChunkManager, ProceduralSpawner, StreamingContext, TrackError};
use crate::config::DespawnConfig;
use crate::ecs::{Entity, EntityTag, World};
use crate::foundation::math::Vec3;
use std::collections::HashSet;

/// Overlap edge for one tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    /// Started overlapping this frame
    Enter(Entity),
    /// Stopped overlapping this frame
    Exit(Entity),
}

/// What one sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneReport {
    /// Streamed entities returned to their pools
    pub released: usize,
    /// Window advances caused by exiting chunks
    pub advances: Vec<AdvanceReport>,
}

/// Trailing boundary that recycles what the player has left behind
#[derive(Debug)]
pub struct DespawnZone {
    distance: f32,
    depth: f32,
    advance_on_exit: bool,
    inside: HashSet<Entity>,
}

impl DespawnZone {
    /// Create a zone; `advance_on_exit` lets exiting chunks drive the window
    pub fn new(config: &DespawnConfig, advance_on_exit: bool) -> Self {
        Self {
            distance: config.distance_behind_player,
            depth: config.trigger_depth.max(0.0),
            advance_on_exit,
            inside: HashSet::new(),
        }
    }

    /// Z range of the slab for a player at `player_z`
    pub fn bounds(&self, player_z: f32) -> (f32, f32) {
        let center = player_z - self.distance;
        (center - self.depth * 0.5, center + self.depth * 0.5)
    }

    /// Drop tracking for an entity that left play without an exit edge
    pub fn forget(&mut self, entity: Entity) {
        self.inside.remove(&entity);
    }

    /// Drop all tracking
    pub fn clear(&mut self) {
        self.inside.clear();
    }

    /// Compare current overlap with the last frame and return the edges
    ///
    /// Enters come first, then exits ordered by Z so the rearmost chunk
    /// leaves first. Tracked entities that went inactive are dropped without
    /// an event.
    pub fn detect(&mut self, world: &World, player_position: Vec3) -> Vec<ZoneEvent> {
        let (low, high) = self.bounds(player_position.z);
        self.inside.retain(|entity| world.is_active(*entity));

        let mut enters = Vec::new();
        let mut exits = Vec::new();
        for entity in world.active_with_tag(EntityTag::TERRAIN | EntityTag::DESPAWN_ON_ENTER) {
            let Some((start, end)) = Self::extent(world, entity) else {
                continue;
            };
            let overlapping = start <= high && end >= low;
            let was_inside = self.inside.contains(&entity);
            if overlapping && !was_inside {
                enters.push(entity);
            } else if !overlapping && was_inside {
                exits.push((start, entity));
            }
        }

        for entity in &enters {
            self.inside.insert(*entity);
        }
        exits.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, entity) in &exits {
            self.inside.remove(entity);
        }

        enters
            .into_iter()
            .map(ZoneEvent::Enter)
            .chain(exits.into_iter().map(|(_, entity)| ZoneEvent::Exit(entity)))
            .collect()
    }

    /// Release an obstacle or pickup that entered the zone
    ///
    /// Returns whether the entity went back to its pool. Other tags are
    /// ignored.
    pub fn on_enter(&mut self, ctx: &mut StreamingContext<'_>, entity: Entity) -> Result<bool, TrackError> {
        if !ctx.world.tag(entity).intersects(EntityTag::DESPAWN_ON_ENTER) {
            return Ok(false);
        }
        self.inside.remove(&entity);
        let released = chunk::release_streamed(ctx, entity)?;
        if released {
            log::trace!("Despawn zone released {:?}", entity);
        }
        Ok(released)
    }

    /// Advance the window when the head chunk leaves the zone
    ///
    /// Any other chunk leaving is ignored so only the head is ever retired.
    pub fn on_exit(
        &mut self,
        ctx: &mut StreamingContext<'_>,
        manager: &mut ChunkManager,
        spawner: &ProceduralSpawner,
        entity: Entity,
    ) -> Result<Option<AdvanceReport>, TrackError> {
        if !self.advance_on_exit || !ctx.world.tag(entity).contains(EntityTag::TERRAIN) {
            return Ok(None);
        }
        if manager.head() != Some(entity) {
            log::warn!(
                "Chunk {:?} left the despawn zone but the window head is {:?}; ignoring",
                entity,
                manager.head()
            );
            return Ok(None);
        }
        let report = manager.advance(ctx, spawner)?;
        self.forget(report.retired);
        Ok(Some(report))
    }

    /// Detect edges and dispatch them
    pub fn sweep(
        &mut self,
        ctx: &mut StreamingContext<'_>,
        manager: &mut ChunkManager,
        spawner: &ProceduralSpawner,
        player_position: Vec3,
    ) -> Result<ZoneReport, TrackError> {
        let mut report = ZoneReport::default();
        for event in self.detect(ctx.world, player_position) {
            match event {
                ZoneEvent::Enter(entity) => {
                    if self.on_enter(ctx, entity)? {
                        report.released += 1;
                    }
                }
                ZoneEvent::Exit(entity) => {
                    if let Some(advance) = self.on_exit(ctx, manager, spawner, entity)? {
                        report.advances.push(advance);
                    }
                }
            }
        }
        Ok(report)
    }

    fn extent(world: &World, entity: Entity) -> Option<(f32, f32)> {
        let z = world.position(entity)?.z;
        match world.get_component::<TerrainChunk>(entity) {
            Some(terrain) => Some((z, z + terrain.length)),
            None => Some((z, z)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SpawnerConfig, TrackConfig};
    use crate::pool::{PoolService, CHUNK_POOL};
    use crate::track::WorldMover;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn zone() -> DespawnZone {
        DespawnZone::new(
            &DespawnConfig {
                distance_behind_player: 50.0,
                trigger_depth: 4.0,
            },
            true,
        )
    }

    fn active_at(world: &mut World, tag: EntityTag, z: f32) -> Entity {
        let entity = world.create_entity("tracked", tag);
        world.set_active(entity, true);
        world.translate(entity, Vec3::new(0.0, 0.0, z));
        entity
    }

    #[test]
    fn test_bounds_trail_the_player() {
        assert_eq!(zone().bounds(10.0), (-42.0, -38.0));
    }

    #[test]
    fn test_point_entity_enters_then_exits() {
        let mut world = World::new();
        let mut zone = zone();
        let rock = active_at(&mut world, EntityTag::OBSTACLE, -40.0);

        assert!(zone.detect(&world, Vec3::zeros()).is_empty());

        world.translate(rock, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(zone.detect(&world, Vec3::zeros()), vec![ZoneEvent::Enter(rock)]);
        assert!(zone.inside.contains(&rock));
        assert!(zone.detect(&world, Vec3::zeros()).is_empty());

        world.translate(rock, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(zone.detect(&world, Vec3::zeros()), vec![ZoneEvent::Exit(rock)]);
    }

    #[test]
    fn test_inactive_entities_are_dropped_silently() {
        let mut world = World::new();
        let mut zone = zone();
        let pickup = active_at(&mut world, EntityTag::PICKUP, -50.0);

        assert_eq!(zone.detect(&world, Vec3::zeros()), vec![ZoneEvent::Enter(pickup)]);
        world.set_active(pickup, false);

        assert!(zone.detect(&world, Vec3::zeros()).is_empty());
        assert!(!zone.inside.contains(&pickup));
    }

    #[test]
    fn test_only_the_head_chunk_advances_the_window() {
        let mut world = World::new();
        let mut pools = PoolService::new();
        pools.init_pool(&mut world, CHUNK_POOL, 3, |world, i| {
            let entity = world.create_entity(format!("chunk_{i}"), EntityTag::TERRAIN);
            world.add_component(entity, TerrainChunk::new(100.0));
            entity
        });
        let mut mover = WorldMover::new(0.0, Vec3::z());
        let mut rng = StdRng::seed_from_u64(3);
        let mut manager = ChunkManager::new(TrackConfig {
            active_chunk_count: 2,
            min_tilt_degrees: 0.0,
            max_tilt_degrees: 0.0,
            ..TrackConfig::default()
        });
        let spawner = ProceduralSpawner::new(SpawnerConfig {
            min_obstacles_per_chunk: 0,
            max_obstacles_per_chunk: 0,
            min_pickups_per_chunk: 0,
            max_pickups_per_chunk: 0,
            min_goals_per_chunk: 0,
            max_goals_per_chunk: 0,
            ..SpawnerConfig::default()
        });
        let mut zone = zone();
        let mut ctx = StreamingContext {
            world: &mut world,
            pools: &mut pools,
            mover: &mut mover,
            rng: &mut rng,
        };
        manager.start(&mut ctx, &spawner).expect("start");
        let head = manager.head().expect("head");
        let tail = manager.tail().expect("tail");

        let ignored = zone.on_exit(&mut ctx, &mut manager, &spawner, tail).expect("exit");
        assert!(ignored.is_none());
        assert_eq!(manager.head(), Some(head));
        assert_eq!(ctx.pools.lent(CHUNK_POOL), Some(2));

        let report = zone.on_exit(&mut ctx, &mut manager, &spawner, head).expect("exit");
        assert_eq!(report.map(|advance| advance.retired), Some(head));
        assert_eq!(manager.head(), Some(tail));
    }

    #[test]
    fn test_goals_are_not_tracked() {
        let mut world = World::new();
        let mut zone = zone();
        active_at(&mut world, EntityTag::GOAL, -50.0);

        assert!(zone.detect(&world, Vec3::zeros()).is_empty());
    }
}
