//! Terrain chunk
//!
//! A chunk is one recyclable segment of the track. Its start anchor is the
//! entity's world position; its end anchor lies one chunk length further
//! along +Z and `sin(tilt) * length` lower. Chaining a chunk at the previous
//! chunk's end anchor therefore accumulates the vertical drop additively,
//! one chunk's own tilt at a time.
//!
//! Child entities are listed on the chunk and point back at it through
//! their owner field. Positions stay in world space: the world mover
//! translates the chunk and each child by the same offset, which is what
//! keeps children glued to the chunk.

use super::{StreamingContext, TrackError};
use crate::ecs::{Entity, World};
use crate::foundation::math::{utils, Transform, Vec3};
use crate::pool::PoolError;
use rand::Rng;

/// Terrain chunk component
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainChunk {
    /// Sequence number within the run
    pub index: u64,
    /// Length along Z
    pub length: f32,
    tilt_degrees: f32,
    tilt_set: bool,
    populated: bool,
    children: Vec<Entity>,
}

impl TerrainChunk {
    /// Create an untilted, unpopulated chunk
    pub fn new(length: f32) -> Self {
        Self {
            index: 0,
            length,
            tilt_degrees: 0.0,
            tilt_set: false,
            populated: false,
            children: Vec::new(),
        }
    }

    /// Draw the tilt uniformly from `[min_degrees, max_degrees]`
    ///
    /// The tilt is fixed for as long as the chunk is in play; a second call
    /// before [`reset_for_reuse`](Self::reset_for_reuse) keeps the first draw.
    pub fn set_random_tilt<R: Rng + ?Sized>(&mut self, rng: &mut R, min_degrees: f32, max_degrees: f32) -> f32 {
        if self.tilt_set {
            log::debug!("Chunk {} keeps its tilt of {:.2} degrees", self.index, self.tilt_degrees);
            return self.tilt_degrees;
        }
        let (low, high) = if min_degrees <= max_degrees {
            (min_degrees, max_degrees)
        } else {
            (max_degrees, min_degrees)
        };
        self.tilt_degrees = rng.gen_range(low..=high);
        self.tilt_set = true;
        self.tilt_degrees
    }

    /// Tilt in degrees
    pub fn tilt_degrees(&self) -> f32 {
        self.tilt_degrees
    }

    /// Tilt in radians
    pub fn tilt_radians(&self) -> f32 {
        utils::deg_to_rad(self.tilt_degrees)
    }

    /// Height lost `local_z` units into the chunk
    pub fn drop_at(&self, local_z: f32) -> f32 {
        local_z * self.tilt_radians().sin()
    }

    /// Offset from the start anchor to the end anchor
    pub fn end_offset(&self) -> Vec3 {
        Vec3::new(0.0, -self.drop_at(self.length), self.length)
    }

    /// Record a child; duplicates are ignored
    pub fn add_child(&mut self, entity: Entity) {
        if !self.children.contains(&entity) {
            self.children.push(entity);
        }
    }

    /// Forget a child, returning whether it was listed
    pub fn remove_child(&mut self, entity: Entity) -> bool {
        let before = self.children.len();
        self.children.retain(|child| *child != entity);
        self.children.len() != before
    }

    /// Listed children in spawn order
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    /// Guard against populating twice
    pub fn mark_populated(&mut self) {
        self.populated = true;
    }

    /// Whether the chunk has been populated
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Clear per-use state on a chunk fresh out of the pool
    pub fn reset_for_reuse(&mut self, index: u64) {
        self.index = index;
        self.tilt_degrees = 0.0;
        self.tilt_set = false;
        self.populated = false;
        self.children.clear();
    }
}

/// Start anchor of `chunk` in world space
pub fn start_anchor(world: &World, chunk: Entity) -> Option<Transform> {
    world.transform(chunk).copied()
}

/// End anchor of `chunk` in world space
pub fn end_anchor(world: &World, chunk: Entity) -> Option<Transform> {
    let start = world.transform(chunk)?;
    let terrain = world.get_component::<TerrainChunk>(chunk)?;
    Some(Transform::from_position_rotation(
        start.position + terrain.end_offset(),
        start.rotation,
    ))
}

/// Place `chunk` so its start anchor sits at `anchor`, oriented by its own tilt
pub fn place_at(world: &mut World, chunk: Entity, anchor: Vec3) -> Result<(), TrackError> {
    let tilt = world
        .get_component::<TerrainChunk>(chunk)
        .map(TerrainChunk::tilt_degrees)
        .ok_or(TrackError::NotAChunk(chunk))?;
    let transform = world.transform_mut(chunk).ok_or(TrackError::NotAChunk(chunk))?;
    *transform = Transform::from_position_rotation(anchor, utils::tilt_rotation(tilt));
    Ok(())
}

/// Place `chunk` so its start anchor coincides with `previous`'s end anchor
pub fn chain_after(world: &mut World, chunk: Entity, previous: Entity) -> Result<(), TrackError> {
    let anchor = end_anchor(world, previous).ok_or(TrackError::NotAChunk(previous))?;
    place_at(world, chunk, anchor.position)
}

/// List `child` under `chunk` and point its owner back at the chunk
pub fn attach_child(world: &mut World, chunk: Entity, child: Entity) -> Result<(), TrackError> {
    world
        .get_component_mut::<TerrainChunk>(chunk)
        .ok_or(TrackError::NotAChunk(chunk))?
        .add_child(child);
    world.set_owner(child, Some(chunk));
    Ok(())
}

/// Return every child of `chunk` to its pool and clear the child list
///
/// Tolerates an empty list and children that were already returned.
/// Returns how many children went back to a pool.
pub fn release_children(ctx: &mut StreamingContext<'_>, chunk: Entity) -> Result<usize, TrackError> {
    let children = match ctx.world.get_component_mut::<TerrainChunk>(chunk) {
        Some(terrain) => std::mem::take(&mut terrain.children),
        None => return Err(TrackError::NotAChunk(chunk)),
    };

    let mut released = 0;
    for child in children {
        if ctx.world.owner(child) == Some(chunk) {
            ctx.world.set_owner(child, None);
        }
        match ctx.pools.release_entity(ctx.world, child) {
            Ok(()) => released += 1,
            Err(PoolError::AlreadyReleased { .. }) => {
                log::debug!("Child {:?} of chunk {:?} was already back in its pool", child, chunk);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(released)
}

/// Take a single streamed entity out of play ahead of its chunk
///
/// The entity is removed from its owner's child list first so the owner's
/// later retirement cannot return an instance that has been lent again.
pub fn release_streamed(ctx: &mut StreamingContext<'_>, entity: Entity) -> Result<bool, TrackError> {
    if let Some(owner) = ctx.world.owner(entity) {
        if let Some(terrain) = ctx.world.get_component_mut::<TerrainChunk>(owner) {
            terrain.remove_child(entity);
        }
        ctx.world.set_owner(entity, None);
    }
    match ctx.pools.release_entity(ctx.world, entity) {
        Ok(()) => Ok(true),
        Err(PoolError::AlreadyReleased { .. }) => Ok(false),
        Err(err) => Err(err.into()),
    }
}
