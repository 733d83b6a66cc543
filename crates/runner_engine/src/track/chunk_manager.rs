//! Chunk manager
//!
//! Owns the sliding window of active chunks in forward travel order: the
//! head is the chunk nearest the player's trailing edge, the tail the one
//! furthest ahead. Each new chunk is chained at the tail's end anchor, so
//! anchors stay coincident however often the window turns over.
//!
//! When the chunk pool runs dry the window shrinks instead of failing.
//! Every later fill tops the window back up, so a missing slot is retried
//! rather than lost.

use super::chunk::{self, TerrainChunk};
use super::{ProceduralSpawner, StreamingContext, TrackError};
use crate::config::{AdvancePolicy, TrackConfig};
use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;
use crate::pool::CHUNK_POOL;
use std::collections::VecDeque;

/// Fill state of the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Fewer chunks than the target count
    Filling,
    /// Exactly the target count
    Steady,
}

/// The chunk under the player, reported when it changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentInfo {
    /// Chunk entity
    pub chunk: Entity,
    /// Sequence number within the run
    pub index: u64,
    /// Slope of the chunk
    pub tilt_degrees: f32,
    /// Unit direction down the slope
    pub travel_direction: Vec3,
}

/// Outcome of one advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceReport {
    /// The chunk returned to its pool
    pub retired: Entity,
    /// Children returned along with it
    pub released_children: usize,
    /// Chunks appended at the tail
    pub added: usize,
}

/// Sliding window of terrain chunks
#[derive(Debug)]
pub struct ChunkManager {
    config: TrackConfig,
    window: VecDeque<Entity>,
    state: WindowState,
    next_index: u64,
    current_segment: Option<Entity>,
}

impl ChunkManager {
    /// Create a manager with an empty window
    pub fn new(config: TrackConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.active_chunk_count),
            config,
            state: WindowState::Filling,
            next_index: 0,
            current_segment: None,
        }
    }

    /// Fill the window up to the target count
    ///
    /// The first chunk of a run starts at the world origin.
    pub fn start(&mut self, ctx: &mut StreamingContext<'_>, spawner: &ProceduralSpawner) -> Result<usize, TrackError> {
        let added = self.fill(ctx, spawner, None)?;
        if self.window.is_empty() {
            return Err(TrackError::MissingChunk(format!(
                "pool '{CHUNK_POOL}' could not supply the first chunk"
            )));
        }
        log::info!("Track started with {} chunks", self.window.len());
        Ok(added)
    }

    /// Retire the head chunk and chain a fresh one at the tail
    ///
    /// Calling this on an empty window is a lifecycle bug and returns
    /// [`TrackError::AdvanceOnEmptyWindow`].
    pub fn advance(&mut self, ctx: &mut StreamingContext<'_>, spawner: &ProceduralSpawner) -> Result<AdvanceReport, TrackError> {
        let Some(head) = self.window.pop_front() else {
            log::error!("advance() called on an empty chunk window");
            return Err(TrackError::AdvanceOnEmptyWindow);
        };

        // The retired head may have been the tail as well
        let fallback = chunk::end_anchor(ctx.world, head).map(|anchor| anchor.position);

        let released_children = chunk::release_children(ctx, head)?;
        ctx.pools.release_entity(ctx.world, head)?;
        if self.current_segment == Some(head) {
            self.current_segment = None;
        }
        log::debug!("Retired chunk {:?} with {} children", head, released_children);

        let added = self.fill(ctx, spawner, fallback)?;
        Ok(AdvanceReport {
            retired: head,
            released_children,
            added,
        })
    }

    /// Per-frame hook for [`AdvancePolicy::SpawnDistance`]
    ///
    /// Tops up a shrunken window, then advances once if the tail's end
    /// anchor is within spawn distance of the player. Does nothing under
    /// other policies.
    pub fn update(
        &mut self,
        ctx: &mut StreamingContext<'_>,
        spawner: &ProceduralSpawner,
        player_z: f32,
    ) -> Result<Option<AdvanceReport>, TrackError> {
        if self.config.advance_policy != AdvancePolicy::SpawnDistance {
            return Ok(None);
        }
        if self.window.len() < self.config.active_chunk_count {
            self.fill(ctx, spawner, None)?;
        }
        let Some(tail_end) = self.tail().and_then(|tail| chunk::end_anchor(ctx.world, tail)) else {
            return Ok(None);
        };
        if tail_end.position.z - player_z < self.config.spawn_distance {
            return self.advance(ctx, spawner).map(Some);
        }
        Ok(None)
    }

    /// Report the chunk under `player_position` if it differs from last time
    pub fn resolve_segment(&mut self, world: &World, player_position: Vec3) -> Option<SegmentInfo> {
        let found = self.window.iter().copied().find(|candidate| {
            let Some(start) = chunk::start_anchor(world, *candidate) else {
                return false;
            };
            let length = world
                .get_component::<TerrainChunk>(*candidate)
                .map_or(0.0, |terrain| terrain.length);
            (start.position.z..start.position.z + length).contains(&player_position.z)
        })?;

        if self.current_segment == Some(found) {
            return None;
        }
        self.current_segment = Some(found);

        let terrain = world.get_component::<TerrainChunk>(found)?;
        let travel_direction = world
            .transform(found)
            .map_or_else(Vec3::z, |transform| transform.forward());
        Some(SegmentInfo {
            chunk: found,
            index: terrain.index,
            tilt_degrees: terrain.tilt_degrees(),
            travel_direction,
        })
    }

    /// Return every chunk and child to its pool and empty the window
    pub fn reset(&mut self, ctx: &mut StreamingContext<'_>) -> Result<usize, TrackError> {
        let mut released = 0;
        while let Some(head) = self.window.pop_front() {
            released += chunk::release_children(ctx, head)?;
            ctx.pools.release_entity(ctx.world, head)?;
            released += 1;
        }
        self.state = WindowState::Filling;
        self.next_index = 0;
        self.current_segment = None;
        log::debug!("Chunk window reset; {} entities returned", released);
        Ok(released)
    }

    /// Chunks in forward travel order
    pub fn window(&self) -> impl Iterator<Item = Entity> + '_ {
        self.window.iter().copied()
    }

    /// Chunk nearest the trailing edge
    pub fn head(&self) -> Option<Entity> {
        self.window.front().copied()
    }

    /// Chunk furthest ahead
    pub fn tail(&self) -> Option<Entity> {
        self.window.back().copied()
    }

    /// Number of chunks in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Fill state
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Chunk last reported under the player
    pub fn current_segment(&self) -> Option<Entity> {
        self.current_segment
    }

    /// Window and geometry settings
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    fn fill(
        &mut self,
        ctx: &mut StreamingContext<'_>,
        spawner: &ProceduralSpawner,
        fallback_anchor: Option<Vec3>,
    ) -> Result<usize, TrackError> {
        let mut added = 0;
        while self.window.len() < self.config.active_chunk_count {
            let entity = match ctx.pools.acquire(CHUNK_POOL) {
                Ok(entity) => entity,
                Err(err) if err.is_exhausted() => {
                    log::warn!(
                        "Chunk window shrinks to {} of {}: {}",
                        self.window.len(),
                        self.config.active_chunk_count,
                        err
                    );
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            self.append(ctx, spawner, entity, fallback_anchor)?;
            added += 1;
        }
        self.state = if self.window.len() >= self.config.active_chunk_count {
            WindowState::Steady
        } else {
            WindowState::Filling
        };
        Ok(added)
    }

    fn append(
        &mut self,
        ctx: &mut StreamingContext<'_>,
        spawner: &ProceduralSpawner,
        entity: Entity,
        fallback_anchor: Option<Vec3>,
    ) -> Result<(), TrackError> {
        let index = self.next_index;
        let terrain = ctx
            .world
            .get_component_mut::<TerrainChunk>(entity)
            .ok_or(TrackError::NotAChunk(entity))?;
        terrain.reset_for_reuse(index);
        terrain.length = self.config.chunk_length;
        let tilt = terrain.set_random_tilt(&mut *ctx.rng, self.config.min_tilt_degrees, self.config.max_tilt_degrees);

        match self.tail() {
            Some(previous) => chunk::chain_after(ctx.world, entity, previous)?,
            None => chunk::place_at(ctx.world, entity, fallback_anchor.unwrap_or_else(Vec3::zeros))?,
        }
        ctx.world.set_name(entity, format!("Chunk_{index}"));
        ctx.world.set_owner(entity, None);
        ctx.world.set_active(entity, true);
        ctx.mover.register(entity);

        spawner.populate(ctx, entity)?;
        self.window.push_back(entity);
        self.next_index += 1;
        log::debug!("Spawned chunk {} with tilt {:.2} degrees", index, tilt);
        Ok(())
    }
}
