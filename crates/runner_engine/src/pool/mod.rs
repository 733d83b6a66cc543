//! Object pooling
//!
//! Pre-instantiated entities are lent and reclaimed instead of created and
//! destroyed, so a long run never allocates track content after startup.

mod object_pool;
mod service;

pub use object_pool::{ObjectPool, PoolStats};
pub use service::PoolService;

/// Pool key for terrain chunks
pub const CHUNK_POOL: &str = "TerrainChunk";

/// Pool key for pickups
pub const PICKUP_POOL: &str = "HotPickup";

/// Pool key for goals
pub const GOAL_POOL: &str = "Goal";

/// Errors that can occur during pool operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No pool was initialized under this key
    #[error("No pool named '{0}'")]
    UnknownPool(String),

    /// Every instance is lent out
    #[error("Pool '{key}' exhausted ({capacity} instances lent)")]
    Exhausted {
        /// Pool key
        key: String,
        /// Pool capacity
        capacity: usize,
    },

    /// The handle is already inactive
    #[error("Handle {handle} already returned to pool '{key}'")]
    AlreadyReleased {
        /// Pool key
        key: String,
        /// Offending handle
        handle: String,
    },

    /// The handle was never created by this pool
    #[error("Handle {handle} does not belong to pool '{key}'")]
    ForeignHandle {
        /// Pool key
        key: String,
        /// Offending handle
        handle: String,
    },

    /// The entity was not created by any pool
    #[error("Entity {0} is not pooled")]
    Unpooled(String),
}

impl PoolError {
    /// Whether this is an exhaustion that callers should skip over
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
