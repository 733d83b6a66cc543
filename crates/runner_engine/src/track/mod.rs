//! Track streaming
//!
//! Keeps a fixed-size window of terrain chunks around the player, populates
//! each new chunk with obstacles, pickups and goals, and translates the whole
//! window backward every frame so the player can stay near the origin.
//!
//! The pieces never reach each other through globals. [`TrackStreamer`]
//! owns them and hands the shared ones out per call as a
//! [`StreamingContext`].

pub mod billboard;
pub mod chunk;
pub mod chunk_manager;
pub mod despawn_zone;
pub mod spawner;
pub mod speed;
pub mod streamer;
pub mod world_mover;

#[cfg(test)]
mod tests;

pub use chunk::TerrainChunk;
pub use chunk_manager::{AdvanceReport, ChunkManager, SegmentInfo, WindowState};
pub use despawn_zone::{DespawnZone, ZoneEvent};
pub use spawner::{KindReport, PopulateReport, ProceduralSpawner};
pub use speed::SlopeSpeed;
pub use streamer::{TickReport, TrackStreamer};
pub use world_mover::{MoverStats, WorldMover};

use crate::config::ConfigError;
use crate::ecs::{Entity, World};
use crate::pool::{PoolError, PoolService};
use rand::rngs::StdRng;

/// Errors that can occur while streaming the track
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    /// `advance` was called while the window held no chunk
    #[error("Cannot advance an empty chunk window")]
    AdvanceOnEmptyWindow,

    /// The handle does not carry a terrain chunk
    #[error("Entity {0:?} is not a terrain chunk")]
    NotAChunk(Entity),

    /// No chunk could be acquired to fill the window
    #[error("No terrain chunk available: {0}")]
    MissingChunk(String),

    /// Pool failure other than exhaustion
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    /// Configuration rejected at construction
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Shared services borrowed for the length of one streaming call
pub struct StreamingContext<'a> {
    /// Entity store
    pub world: &'a mut World,
    /// Keyed pools
    pub pools: &'a mut PoolService,
    /// Per-frame translator
    pub mover: &'a mut WorldMover,
    /// The one RNG every random draw goes through
    pub rng: &'a mut StdRng,
}
