//! Track streamer
//!
//! Composition root for the streaming core. Builds every pool from the
//! configuration, owns the window, spawner, despawn zone and world mover,
//! and runs them in order once per frame.

use super::chunk::{self, TerrainChunk};
use super::{
    billboard, AdvanceReport, ChunkManager, DespawnZone, MoverStats, ProceduralSpawner, SegmentInfo, SlopeSpeed,
    StreamingContext, TrackError, WorldMover,
};
use crate::config::{AdvancePolicy, RunnerConfig};
use crate::ecs::{Behavior, Entity, EntityTag, World};
use crate::events::SegmentListener;
use crate::foundation::math::Vec3;
use crate::pool::{PoolService, CHUNK_POOL, GOAL_POOL, PICKUP_POOL};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// What one frame did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// World mover sweep
    pub mover: MoverStats,
    /// Chunks retired this frame
    pub advances: Vec<AdvanceReport>,
    /// Streamed entities released by the despawn zone
    pub released: usize,
    /// Segment the player moved onto, if it changed
    pub segment: Option<SegmentInfo>,
    /// Travel speed after this frame
    pub speed: f32,
}

/// Streams the track around a player standing near the origin
pub struct TrackStreamer {
    config: RunnerConfig,
    world: World,
    pools: PoolService,
    mover: WorldMover,
    manager: ChunkManager,
    spawner: ProceduralSpawner,
    zone: DespawnZone,
    slope: Option<SlopeSpeed>,
    rng: StdRng,
}

impl TrackStreamer {
    /// Validate `config` and pre-instantiate every pool
    pub fn new(config: RunnerConfig) -> Result<Self, TrackError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut world = World::new();
        let mut pools = PoolService::new();
        Self::init_pools(&config, &mut world, &mut pools);

        let advance_on_exit = config.track.advance_policy == AdvancePolicy::DespawnZone;
        Ok(Self {
            world,
            pools,
            mover: WorldMover::new(config.mover.speed, config.mover.forward_axis),
            manager: ChunkManager::new(config.track.clone()),
            spawner: ProceduralSpawner::new(config.spawner.clone()),
            zone: DespawnZone::new(&config.despawn, advance_on_exit),
            slope: config.gameplay.slope_speed.clone().map(SlopeSpeed::new),
            rng,
            config,
        })
    }

    fn init_pools(config: &RunnerConfig, world: &mut World, pools: &mut PoolService) {
        let chunk_length = config.track.chunk_length;
        pools.init_pool(world, CHUNK_POOL, config.pools.chunk_capacity, |world, i| {
            let entity = world.create_entity(format!("{CHUNK_POOL}_{i}"), EntityTag::TERRAIN);
            world.add_component(entity, TerrainChunk::new(chunk_length));
            entity
        });

        for key in &config.spawner.obstacle_pools {
            pools.init_pool(world, key, config.pools.obstacle_capacity, |world, i| {
                let entity = world.create_entity(format!("{key}_{i}"), EntityTag::OBSTACLE);
                world.add_component(entity, Behavior::Obstacle);
                entity
            });
        }

        let frost_reduction = config.gameplay.pickup_frost_reduction;
        pools.init_pool(world, PICKUP_POOL, config.pools.pickup_capacity, |world, i| {
            let entity = world.create_entity(format!("{PICKUP_POOL}_{i}"), EntityTag::PICKUP);
            world.add_component(entity, Behavior::Pickup { frost_reduction });
            entity
        });

        let points = config.gameplay.goal_points;
        pools.init_pool(world, GOAL_POOL, config.pools.goal_capacity, |world, i| {
            let entity = world.create_entity(format!("{GOAL_POOL}_{i}"), EntityTag::GOAL);
            world.add_component(entity, Behavior::Goal { points, cleared: false });
            entity
        });
    }

    /// Fill the window for a new run
    pub fn start(&mut self) -> Result<usize, TrackError> {
        let Self {
            world,
            pools,
            mover,
            manager,
            spawner,
            rng,
            ..
        } = self;
        let mut ctx = StreamingContext { world, pools, mover, rng };
        manager.start(&mut ctx, spawner)
    }

    /// Run one frame
    ///
    /// Order: translate the world, recycle by the configured policy, report
    /// a segment change, ramp the speed, re-face billboards.
    pub fn tick(
        &mut self,
        delta_time: f32,
        player_position: Vec3,
        segments: &mut dyn SegmentListener,
    ) -> Result<TickReport, TrackError> {
        let Self {
            config,
            world,
            pools,
            mover,
            manager,
            spawner,
            zone,
            slope,
            rng,
        } = self;

        let mut report = TickReport {
            mover: mover.update(world, delta_time),
            ..TickReport::default()
        };

        let mut ctx = StreamingContext { world, pools, mover, rng };
        if let Some(advance) = manager.update(&mut ctx, spawner, player_position.z)? {
            zone.forget(advance.retired);
            report.advances.push(advance);
        }

        let swept = zone.sweep(&mut ctx, manager, spawner, player_position)?;
        report.released = swept.released;
        report.advances.extend(swept.advances);

        report.segment = manager.resolve_segment(ctx.world, player_position);
        if let Some(segment) = &report.segment {
            segments.enter_segment(segment);
            if let Some(slope) = slope.as_mut() {
                slope.on_enter_segment(segment.tilt_degrees);
            }
        }

        if let Some(slope) = slope.as_ref() {
            let speed = slope.step(ctx.mover.speed());
            ctx.mover.set_speed(speed);
        }
        report.speed = ctx.mover.speed();

        if config.spawner.billboards {
            billboard::refresh_billboards(ctx.world, config.spawner.viewpoint);
        }
        Ok(report)
    }

    /// Retire the head chunk immediately
    pub fn advance(&mut self) -> Result<AdvanceReport, TrackError> {
        let Self {
            world,
            pools,
            mover,
            manager,
            spawner,
            zone,
            rng,
            ..
        } = self;
        let mut ctx = StreamingContext { world, pools, mover, rng };
        let report = manager.advance(&mut ctx, spawner)?;
        zone.forget(report.retired);
        Ok(report)
    }

    /// Take one streamed entity out of play ahead of its chunk
    pub fn release_streamed(&mut self, entity: Entity) -> Result<bool, TrackError> {
        self.zone.forget(entity);
        let mut ctx = StreamingContext {
            world: &mut self.world,
            pools: &mut self.pools,
            mover: &mut self.mover,
            rng: &mut self.rng,
        };
        chunk::release_streamed(&mut ctx, entity)
    }

    /// Return everything to the pools for a restart
    pub fn reset(&mut self) -> Result<usize, TrackError> {
        let mut ctx = StreamingContext {
            world: &mut self.world,
            pools: &mut self.pools,
            mover: &mut self.mover,
            rng: &mut self.rng,
        };
        let released = self.manager.reset(&mut ctx)?;
        self.zone.clear();
        self.mover.clear();
        self.mover.set_speed(self.config.mover.speed);
        self.slope = self.config.gameplay.slope_speed.clone().map(SlopeSpeed::new);
        log::info!("Track reset; {} entities returned to pools", released);
        Ok(released)
    }

    /// Configuration the streamer was built from
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Entity store
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable entity store
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Keyed pools
    pub fn pools(&self) -> &PoolService {
        &self.pools
    }

    /// World mover
    pub fn mover(&self) -> &WorldMover {
        &self.mover
    }

    /// Mutable world mover, e.g. to change speed
    pub fn mover_mut(&mut self) -> &mut WorldMover {
        &mut self.mover
    }

    /// Chunk window
    pub fn manager(&self) -> &ChunkManager {
        &self.manager
    }

    /// Despawn zone
    pub fn zone(&self) -> &DespawnZone {
        &self.zone
    }

    /// Slope speed controller, when configured
    pub fn slope(&self) -> Option<&SlopeSpeed> {
        self.slope.as_ref()
    }

    /// Lent instances across every streamed-content pool
    pub fn lent_streamed(&self) -> usize {
        self.config
            .spawner
            .obstacle_pools
            .iter()
            .map(String::as_str)
            .chain([PICKUP_POOL, GOAL_POOL])
            .filter_map(|key| self.pools.lent(key))
            .sum()
    }
}
