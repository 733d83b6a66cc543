//! # Runner Engine
//!
//! Track streaming core for endless-runner games.
//!
//! ## Features
//!
//! - **Object Pooling**: Pre-instantiated pools keyed by name, no runtime allocation
//! - **Chunk Streaming**: A sliding window of tilted terrain chunks joined end to start
//! - **Procedural Population**: Obstacles, pickups and goals placed on each chunk
//! - **World Translation**: The world moves toward a stationary player
//! - **Despawn Zone**: Content behind the player goes back to its pool
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use runner_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut streamer = TrackStreamer::new(RunnerConfig::default())?;
//!     streamer.start()?;
//!
//!     let mut clock = FrameClock::fixed(1.0 / 60.0);
//!     for _ in 0..600 {
//!         let delta_time = clock.tick();
//!         streamer.tick(delta_time, Vec3::zeros(), &mut NullSink)?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod pool;
pub mod track;
pub mod events;
pub mod gameplay;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{AdvancePolicy, Config, ConfigError, RunnerConfig},
        ecs::{Behavior, Entity, EntityTag, World},
        events::{Collaborators, EffectKind, EffectSink, FailureSink, NullSink, ScoreSink, SegmentListener},
        foundation::{
            math::{Transform, Vec3},
            time::FrameClock,
        },
        gameplay::{GameSession, SessionPhase},
        pool::{PoolError, PoolService},
        track::{SegmentInfo, TickReport, TrackError, TrackStreamer},
    };
}
