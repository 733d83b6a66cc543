//! Collaborators notified by the streaming core
//!
//! Scoring, failure handling and effects live outside the core. The core
//! only calls into these traits and never depends on what happens behind
//! them.

use crate::foundation::math::Vec3;
use crate::track::SegmentInfo;

/// Kind of feedback effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Player hit an obstacle
    Crash,
    /// Player collected a pickup
    Pickup,
    /// Player cleared a goal
    Goal,
    /// Lingering effects should be cleared
    Reset,
}

/// Failure reported by an effect collaborator
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// No effect is registered for the kind
    #[error("No effect registered for {0:?}")]
    Missing(EffectKind),

    /// Playback failed
    #[error("Effect playback failed: {0}")]
    Playback(String),
}

/// Receives points for cleared goals
pub trait ScoreSink {
    /// Add `amount` points
    fn register_points(&mut self, amount: i32);
}

/// Told when the player hits an obstacle
pub trait FailureSink {
    /// The run has failed
    fn notify_failure(&mut self);
}

/// Plays fire-and-forget feedback
pub trait EffectSink {
    /// Play `kind` at `position`
    fn play_effect(&mut self, kind: EffectKind, position: Vec3) -> Result<(), EffectError>;
}

/// Told when the player moves onto a new chunk
pub trait SegmentListener {
    /// The player entered `segment`
    fn enter_segment(&mut self, segment: &SegmentInfo);
}

/// Collaborator that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ScoreSink for NullSink {
    fn register_points(&mut self, _amount: i32) {}
}

impl FailureSink for NullSink {
    fn notify_failure(&mut self) {}
}

impl EffectSink for NullSink {
    fn play_effect(&mut self, _kind: EffectKind, _position: Vec3) -> Result<(), EffectError> {
        Ok(())
    }
}

impl SegmentListener for NullSink {
    fn enter_segment(&mut self, _segment: &SegmentInfo) {}
}

/// Play an effect, logging and discarding any failure
pub fn play_effect_logged(sink: &mut dyn EffectSink, kind: EffectKind, position: Vec3) {
    if let Err(err) = sink.play_effect(kind, position) {
        log::warn!("Effect {:?} failed: {}", kind, err);
    }
}

/// The set of collaborators a frame reports to
pub struct Collaborators<'a> {
    /// Scoring
    pub score: &'a mut dyn ScoreSink,
    /// Failure handling
    pub failure: &'a mut dyn FailureSink,
    /// Feedback effects
    pub effects: &'a mut dyn EffectSink,
    /// Segment changes
    pub segments: &'a mut dyn SegmentListener,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenEffects {
        calls: usize,
    }

    impl EffectSink for BrokenEffects {
        fn play_effect(&mut self, kind: EffectKind, _position: Vec3) -> Result<(), EffectError> {
            self.calls += 1;
            Err(EffectError::Missing(kind))
        }
    }

    #[test]
    fn test_effect_errors_are_swallowed() {
        let mut sink = BrokenEffects { calls: 0 };
        play_effect_logged(&mut sink, EffectKind::Goal, Vec3::zeros());
        play_effect_logged(&mut sink, EffectKind::Crash, Vec3::zeros());
        assert_eq!(sink.calls, 2);
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullSink;
        sink.register_points(100);
        sink.notify_failure();
        assert!(sink.play_effect(EffectKind::Pickup, Vec3::zeros()).is_ok());
    }
}
