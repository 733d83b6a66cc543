//! Trigger behavior carried by streamed entities

use crate::ecs::EntityTag;

/// What happens when the player touches a streamed entity
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Ends the run
    Obstacle,
    /// Partial reward; removes some frost
    Pickup {
        /// Frost removed on collection
        frost_reduction: f32,
    },
    /// Awards points once
    Goal {
        /// Points awarded
        points: i32,
        /// Set after the first award so a goal never pays twice
        cleared: bool,
    },
}

impl Behavior {
    /// Tag matching this behavior
    pub fn tag(&self) -> EntityTag {
        match self {
            Self::Obstacle => EntityTag::OBSTACLE,
            Self::Pickup { .. } => EntityTag::PICKUP,
            Self::Goal { .. } => EntityTag::GOAL,
        }
    }

    /// Clear per-use state before a pooled instance goes back into play
    pub fn reset_for_reuse(&mut self) {
        if let Self::Goal { cleared, .. } = self {
            *cleared = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_reset_clears_flag() {
        let mut goal = Behavior::Goal { points: 100, cleared: true };
        goal.reset_for_reuse();
        assert_eq!(goal, Behavior::Goal { points: 100, cleared: false });
        assert_eq!(goal.tag(), EntityTag::GOAL);
    }
}
