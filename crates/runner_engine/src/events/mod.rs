//! Collaborator notifications and deferred tasks
//!
//! The streaming core reports what happened through collaborator traits and
//! schedules delayed work (session phase changes, effect resets) on a
//! [`TimerQueue`] instead of waiting.

mod collaborators;
mod timer_queue;

pub use collaborators::{
    play_effect_logged, Collaborators, EffectError, EffectKind, EffectSink, FailureSink, NullSink, ScoreSink,
    SegmentListener,
};
pub use timer_queue::{TimerQueue, TimerToken};
