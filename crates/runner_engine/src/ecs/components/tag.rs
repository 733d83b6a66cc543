//! Entity tags used for trigger filtering
//!
//! Tags follow the collision-layer idea: each kind of track content owns a
//! bit, and zones or resolvers filter on a mask.

use bitflags::bitflags;

bitflags! {
    /// Kind of track content an entity represents
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntityTag: u32 {
        /// Terrain chunk
        const TERRAIN = 1 << 0;
        /// Failure trigger
        const OBSTACLE = 1 << 1;
        /// Partial-reward trigger
        const PICKUP = 1 << 2;
        /// Scoring trigger
        const GOAL = 1 << 3;

        /// Anything a chunk populates
        const STREAMED = Self::OBSTACLE.bits() | Self::PICKUP.bits() | Self::GOAL.bits();
        /// What the despawn zone releases on entry
        const DESPAWN_ON_ENTER = Self::OBSTACLE.bits() | Self::PICKUP.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        assert!(EntityTag::STREAMED.contains(EntityTag::GOAL));
        assert!(!EntityTag::STREAMED.contains(EntityTag::TERRAIN));
        assert!(EntityTag::DESPAWN_ON_ENTER.intersects(EntityTag::PICKUP));
        assert!(!EntityTag::DESPAWN_ON_ENTER.intersects(EntityTag::GOAL));
    }
}
