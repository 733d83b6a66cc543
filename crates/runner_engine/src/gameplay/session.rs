//! Run lifecycle
//!
//! A session walks MainMenu -> Starting -> Active -> Ending and back to
//! MainMenu. Phase changes that wait on a delay go through the timer queue
//! so the frame loop never blocks.

use super::{ContactReport, ContactResolver};
use crate::config::RunnerConfig;
use crate::events::{play_effect_logged, Collaborators, EffectKind, TimerQueue};
use crate::foundation::math::Vec3;
use crate::track::{TickReport, TrackError, TrackStreamer};

const CLEAR_EFFECTS_SLOT: &str = "clear_effects";

/// Where the run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Waiting for the player to start
    #[default]
    MainMenu,
    /// Track built, countdown running
    Starting,
    /// Track streaming and contacts live
    Active,
    /// Run failed, waiting to restart
    Ending,
}

/// Deferred work posted by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTask {
    /// Countdown finished
    BeginActive,
    /// Failure delay finished
    Restart,
    /// Lingering pickup effects should go
    ClearEffects,
}

/// What one session frame did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFrame {
    /// Streaming tick, present only while active
    pub tick: Option<TickReport>,
    /// Contacts resolved this frame
    pub contacts: ContactReport,
}

/// Drives a [`TrackStreamer`] through the run lifecycle
pub struct GameSession {
    phase: SessionPhase,
    streamer: TrackStreamer,
    contacts: ContactResolver,
    timers: TimerQueue<SessionTask>,
    start_delay: f32,
    end_delay: f32,
    effect_reset_delay: f32,
}

impl GameSession {
    /// Build the streamer and wait in the menu
    pub fn new(config: RunnerConfig) -> Result<Self, TrackError> {
        let gameplay = config.gameplay.clone();
        Ok(Self {
            phase: SessionPhase::MainMenu,
            streamer: TrackStreamer::new(config)?,
            contacts: ContactResolver::new(gameplay.contact_radius),
            timers: TimerQueue::new(),
            start_delay: gameplay.start_delay,
            end_delay: gameplay.end_delay,
            effect_reset_delay: gameplay.effect_reset_delay,
        })
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The track being streamed
    pub fn streamer(&self) -> &TrackStreamer {
        &self.streamer
    }

    /// Mutable access to the track
    pub fn streamer_mut(&mut self) -> &mut TrackStreamer {
        &mut self.streamer
    }

    /// Tasks waiting on a delay
    pub fn pending_tasks(&self) -> usize {
        self.timers.pending()
    }

    /// Build the track and start the countdown; ignored outside the menu
    pub fn start_game(&mut self) -> Result<bool, TrackError> {
        if self.phase != SessionPhase::MainMenu {
            log::debug!("start_game ignored in {:?}", self.phase);
            return Ok(false);
        }
        self.streamer.start()?;
        self.set_phase(SessionPhase::Starting);
        self.timers.schedule(self.start_delay, SessionTask::BeginActive);
        Ok(true)
    }

    /// Run one frame
    pub fn update(
        &mut self,
        delta_time: f32,
        player_position: Vec3,
        collaborators: &mut Collaborators<'_>,
    ) -> Result<SessionFrame, TrackError> {
        for task in self.timers.advance(delta_time) {
            self.run_task(task, player_position, collaborators)?;
        }

        let mut frame = SessionFrame::default();
        if self.phase != SessionPhase::Active {
            return Ok(frame);
        }

        frame.tick = Some(self.streamer.tick(delta_time, player_position, &mut *collaborators.segments)?);
        frame.contacts = self.contacts.resolve(&mut self.streamer, player_position, collaborators)?;

        if frame.contacts.failed {
            self.streamer.mover_mut().set_speed(0.0);
            self.set_phase(SessionPhase::Ending);
            self.timers.schedule(self.end_delay, SessionTask::Restart);
        }
        if frame.contacts.pickups > 0 {
            self.timers
                .schedule_exclusive(CLEAR_EFFECTS_SLOT, self.effect_reset_delay, SessionTask::ClearEffects);
        }
        Ok(frame)
    }

    fn run_task(
        &mut self,
        task: SessionTask,
        player_position: Vec3,
        collaborators: &mut Collaborators<'_>,
    ) -> Result<(), TrackError> {
        match task {
            SessionTask::BeginActive => {
                if self.phase == SessionPhase::Starting {
                    self.set_phase(SessionPhase::Active);
                }
            }
            SessionTask::Restart => {
                self.streamer.reset()?;
                self.timers.cancel_slot(CLEAR_EFFECTS_SLOT);
                self.set_phase(SessionPhase::MainMenu);
            }
            SessionTask::ClearEffects => {
                play_effect_logged(collaborators.effects, EffectKind::Reset, player_position);
            }
        }
        Ok(())
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            log::info!("Session {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}
