//! Player contact with streamed entities
//!
//! Contact is a horizontal circle test around the player. Whatever the
//! player touches is consumed: it goes back to its pool ahead of its chunk.

use crate::ecs::{Behavior, Entity, EntityTag};
use crate::events::{play_effect_logged, Collaborators, EffectKind};
use crate::foundation::math::Vec3;
use crate::track::{TrackError, TrackStreamer};

/// What the player touched this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactReport {
    /// An obstacle was hit
    pub failed: bool,
    /// Pickups collected
    pub pickups: u32,
    /// Frost removed by those pickups
    pub frost_reduced: f32,
    /// Goals cleared
    pub goals: u32,
    /// Points awarded by those goals
    pub points: i32,
}

/// Tests the player against active streamed entities
#[derive(Debug, Clone, Copy)]
pub struct ContactResolver {
    radius: f32,
}

impl ContactResolver {
    /// Create a resolver with a horizontal contact radius
    pub fn new(radius: f32) -> Self {
        Self { radius: radius.max(0.0) }
    }

    /// Active streamed entities within the radius, nearest-Z first
    pub fn touching(&self, streamer: &TrackStreamer, player_position: Vec3) -> Vec<Entity> {
        let world = streamer.world();
        let radius_squared = self.radius * self.radius;
        let mut hits: Vec<(f32, Entity)> = world
            .active_with_tag(EntityTag::STREAMED)
            .filter_map(|entity| {
                let position = world.position(entity)?;
                let dx = position.x - player_position.x;
                let dz = position.z - player_position.z;
                (dx * dx + dz * dz <= radius_squared).then_some((position.z, entity))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Apply every contact and notify the collaborators
    pub fn resolve(
        &self,
        streamer: &mut TrackStreamer,
        player_position: Vec3,
        collaborators: &mut Collaborators<'_>,
    ) -> Result<ContactReport, TrackError> {
        let mut report = ContactReport::default();

        for entity in self.touching(streamer, player_position) {
            let position = streamer.world().position(entity).unwrap_or(player_position);
            let Some(behavior) = streamer.world_mut().get_component_mut::<Behavior>(entity) else {
                continue;
            };

            match behavior {
                Behavior::Obstacle => {
                    report.failed = true;
                    log::info!("Player hit obstacle {:?}", entity);
                    collaborators.failure.notify_failure();
                    play_effect_logged(collaborators.effects, EffectKind::Crash, position);
                }
                Behavior::Pickup { frost_reduction } => {
                    report.pickups += 1;
                    report.frost_reduced += *frost_reduction;
                    play_effect_logged(collaborators.effects, EffectKind::Pickup, position);
                }
                Behavior::Goal { points, cleared } => {
                    if *cleared {
                        continue;
                    }
                    *cleared = true;
                    let points = *points;
                    report.goals += 1;
                    report.points += points;
                    log::debug!("Goal cleared for {} points", points);
                    collaborators.score.register_points(points);
                    play_effect_logged(collaborators.effects, EffectKind::Goal, position);
                }
            }
            streamer.release_streamed(entity)?;
        }

        Ok(report)
    }
}
