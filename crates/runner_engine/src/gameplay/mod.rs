//! Gameplay on top of the streamed track
//!
//! Resolves player contact with streamed content and sequences a run from
//! the menu through start, play, failure and restart.

mod contacts;
mod session;

pub use contacts::{ContactReport, ContactResolver};
pub use session::{GameSession, SessionFrame, SessionPhase, SessionTask};
