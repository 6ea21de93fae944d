//! chat_state - Session-scoped state machines for the chat engine
//!
//! Three independent pieces of per-session state live here:
//! - [`SessionModes`]: edge-triggered boolean behavior toggles
//! - [`GameState`]: the guessing-game controller layered on the transcript
//! - [`InactivityClock`]: elapsed-time tracking for the timeout mode
//!
//! All of it is plain owned data; the orchestrator bundles these values into
//! its session and applies their outcomes to the transcript.

pub mod game;
pub mod inactivity;
pub mod modes;

pub use game::{GameOutcome, GameState, SECRET_PROGRESSION};
pub use inactivity::InactivityClock;
pub use modes::{ModeChange, ModeError, SessionFeatures, SessionMode, SessionModes};
