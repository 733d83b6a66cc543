//! Procedural spawner
//!
//! Fills a chunk with obstacles, pickups and goals. Every entity lands on a
//! lane at a random distance into the chunk, at the height of the tilted
//! ground at that distance:
//!
//! ```text
//! y = chunk_start.y + base_height - local_z * sin(tilt)
//! ```
//!
//! Pool exhaustion skips that one entity and the chunk is still marked
//! populated, so a dense configuration degrades instead of failing.

use super::chunk::{self, TerrainChunk};
use super::{billboard, StreamingContext, TrackError};
use crate::config::SpawnerConfig;
use crate::ecs::{Behavior, Entity};
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::pool::{GOAL_POOL, PICKUP_POOL};
use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome for one kind of content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindReport {
    /// Instances the random draw asked for
    pub requested: u32,
    /// Instances placed
    pub spawned: u32,
    /// Instances dropped because the pool was exhausted
    pub skipped: u32,
}

impl KindReport {
    /// Count every request from `attempt` on as skipped
    fn skip_rest(&mut self, attempt: u32) {
        self.skipped += self.requested - attempt;
    }
}

/// Outcome of one populate call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Obstacles across every variant
    pub obstacles: KindReport,
    /// Pickups
    pub pickups: KindReport,
    /// Goals
    pub goals: KindReport,
    /// The chunk was already populated and nothing was done
    pub already_populated: bool,
}

impl PopulateReport {
    /// Entities placed across all kinds
    pub fn total_spawned(&self) -> u32 {
        self.obstacles.spawned + self.pickups.spawned + self.goals.spawned
    }

    /// Entities skipped across all kinds
    pub fn total_skipped(&self) -> u32 {
        self.obstacles.skipped + self.pickups.skipped + self.goals.skipped
    }
}

/// Where on the chunk the next entity goes
#[derive(Debug, Clone, Copy)]
struct Ground {
    start: Vec3,
    length: f32,
    tilt_sin: f32,
    rotation: Quat,
}

/// Populates chunks from a [`SpawnerConfig`]
#[derive(Debug, Clone)]
pub struct ProceduralSpawner {
    config: SpawnerConfig,
}

impl ProceduralSpawner {
    /// Create a spawner
    pub fn new(config: SpawnerConfig) -> Self {
        Self { config }
    }

    /// Spawner settings
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Populate `chunk` once
    ///
    /// A second call on the same chunk acquires nothing and reports
    /// `already_populated`.
    pub fn populate(&self, ctx: &mut StreamingContext<'_>, chunk: Entity) -> Result<PopulateReport, TrackError> {
        let terrain = ctx
            .world
            .get_component::<TerrainChunk>(chunk)
            .ok_or(TrackError::NotAChunk(chunk))?;
        if terrain.is_populated() {
            log::debug!("Chunk {} already populated; skipping", terrain.index);
            return Ok(PopulateReport {
                already_populated: true,
                ..PopulateReport::default()
            });
        }

        let transform = ctx.world.transform(chunk).copied().unwrap_or_else(Transform::identity);
        let ground = Ground {
            start: transform.position,
            length: terrain.length,
            tilt_sin: terrain.tilt_radians().sin(),
            rotation: transform.rotation,
        };
        let index = terrain.index;

        let mut report = PopulateReport::default();

        // An exhausted variant is dropped for the rest of this call
        let mut variants: Vec<&str> = self.config.obstacle_pools.iter().map(String::as_str).collect();
        report.obstacles.requested = self.obstacle_count(ctx.rng);
        for attempt in 0..report.obstacles.requested {
            let Some(key) = variants.choose(&mut *ctx.rng).copied() else {
                report.obstacles.skip_rest(attempt);
                break;
            };
            if self.spawn_one(ctx, chunk, &ground, key, self.config.obstacle_height)? {
                report.obstacles.spawned += 1;
            } else {
                report.obstacles.skipped += 1;
                variants.retain(|variant| *variant != key);
            }
        }

        report.pickups.requested = Self::draw(ctx.rng, self.config.min_pickups_per_chunk, self.config.max_pickups_per_chunk);
        self.spawn_kind(ctx, chunk, &ground, PICKUP_POOL, self.config.pickup_height, &mut report.pickups)?;

        report.goals.requested = Self::draw(ctx.rng, self.config.min_goals_per_chunk, self.config.max_goals_per_chunk);
        self.spawn_kind(ctx, chunk, &ground, GOAL_POOL, self.config.goal_height, &mut report.goals)?;

        if let Some(terrain) = ctx.world.get_component_mut::<TerrainChunk>(chunk) {
            terrain.mark_populated();
        }

        log::debug!(
            "Populated chunk {}: {} spawned, {} skipped",
            index,
            report.total_spawned(),
            report.total_skipped()
        );
        if report.total_skipped() > 0 {
            log::warn!(
                "Chunk {} skipped {} entities on exhausted pools",
                index,
                report.total_skipped()
            );
        }
        Ok(report)
    }

    fn draw<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        rng.gen_range(min..=max)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn obstacle_count<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let base = Self::draw(rng, self.config.min_obstacles_per_chunk, self.config.max_obstacles_per_chunk);
        (base as f32 * self.config.obstacle_density.max(0.0)).round() as u32
    }

    /// Distance into the chunk, kept `edge_margin` away from both ends
    fn local_z<R: Rng + ?Sized>(&self, rng: &mut R, length: f32) -> f32 {
        let margin = self.config.edge_margin.max(0.0);
        let (low, high) = (margin, length - margin);
        if low >= high {
            return length * 0.5;
        }
        rng.gen_range(low..=high)
    }

    /// Spawn up to `kind.requested` from one pool, stopping at exhaustion
    fn spawn_kind(
        &self,
        ctx: &mut StreamingContext<'_>,
        chunk: Entity,
        ground: &Ground,
        key: &str,
        base_height: f32,
        kind: &mut KindReport,
    ) -> Result<(), TrackError> {
        for attempt in 0..kind.requested {
            if !self.spawn_one(ctx, chunk, ground, key, base_height)? {
                kind.skip_rest(attempt);
                break;
            }
            kind.spawned += 1;
        }
        Ok(())
    }

    /// Acquire, place and activate one entity; `Ok(false)` on exhaustion
    fn spawn_one(
        &self,
        ctx: &mut StreamingContext<'_>,
        chunk: Entity,
        ground: &Ground,
        key: &str,
        base_height: f32,
    ) -> Result<bool, TrackError> {
        let entity = match ctx.pools.acquire(key) {
            Ok(entity) => entity,
            Err(err) if err.is_exhausted() => {
                log::trace!("{}", err);
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };

        let lane = self.config.lanes.choose(&mut *ctx.rng).copied().unwrap_or(0.0);
        let local_z = self.local_z(ctx.rng, ground.length);
        let position = Vec3::new(
            ground.start.x + lane,
            ground.start.y + base_height - local_z * ground.tilt_sin,
            ground.start.z + local_z,
        );

        if let Some(transform) = ctx.world.transform_mut(entity) {
            *transform = Transform::from_position_rotation(position, ground.rotation);
        }
        if self.config.billboards {
            billboard::face_viewpoint(ctx.world, entity, self.config.viewpoint);
        }
        if let Some(behavior) = ctx.world.get_component_mut::<Behavior>(entity) {
            behavior.reset_for_reuse();
        }

        ctx.mover.register(entity);
        chunk::attach_child(ctx.world, chunk, entity)?;
        ctx.world.set_active(entity, true);
        log::trace!("Spawned {:?} from '{}' at {:?}", entity, key, position);
        Ok(true)
    }
}
