//! chat_orchestrator - The chat session engine
//!
//! Owns the per-session state bundle (transcript, game, modes, inactivity
//! clock, busy flag) and drives the turn loop: user input through the
//! guessing game, transcript append, prompt assembly, budget gate, streamed
//! generation, and the in-order chunk fold back into the transcript.

pub mod config;
pub mod error;
pub mod session;
pub mod watcher;

pub use config::{ModeNoticeStyle, SessionConfig};
pub use error::{Result, SessionError};
pub use session::{
    ChatSession, GenerationOutcome, GenerationSummary, SubmitOutcome, SESSION_TIMEOUT_NOTICE,
};
pub use watcher::spawn_inactivity_watcher;
