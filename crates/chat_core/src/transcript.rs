//! Transcript - the ordered message log owned by one session
//!
//! Invariants:
//! - never empty after construction (seeded with an assistant greeting)
//! - insertion order defines conversation causality and maps 1:1 into the
//!   wire prompt
//! - a new generation is wanted iff the last entry's role does not end a turn

use crate::message::{Message, MessageStatus, Role};

/// Greeting used to seed a fresh transcript.
pub const DEFAULT_GREETING: &str = "Hi. I'm Arctic, a new, efficient, intelligent, \
and truly open language model created by Snowflake AI Research. Ask me anything.";

/// Ordered log of exchanged messages.
///
/// The seeding greeting is remembered so [`Transcript::reset`] restores the
/// exact initial state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    greeting: String,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Create a transcript seeded with [`DEFAULT_GREETING`].
    pub fn new() -> Self {
        Self::with_greeting(DEFAULT_GREETING)
    }

    /// Create a transcript seeded with a custom assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            messages: vec![Message::assistant(greeting.clone())],
            greeting,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the seeding invariant keeps at least one entry.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> &Message {
        self.messages.last().expect("transcript is never empty")
    }

    pub fn last_role(&self) -> Role {
        self.last().role
    }

    /// Whether the session should trigger a new generation: true iff the last
    /// entry was authored by the user (any user role).
    pub fn wants_reply(&self) -> bool {
        !self.last_role().ends_turn()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Destructively replace the whole log with a single message.
    ///
    /// Used by the guessing game: a successful guess clears prior turns and
    /// leaves one gamemaster announcement.
    pub fn replace_with(&mut self, message: Message) {
        self.messages.clear();
        self.messages.push(message);
    }

    /// Drop all turns and restore the seeded greeting. Idempotent.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(Message::assistant(self.greeting.clone()));
    }

    // ------------------------------------------------------------------
    // Streaming reply lifecycle
    // ------------------------------------------------------------------

    /// Open an empty assistant reply that will be built up chunk by chunk.
    pub fn begin_reply(&mut self) {
        tracing::debug!(len = self.messages.len(), "transcript: begin streaming reply");
        self.messages.push(Message::streaming_reply());
    }

    /// Append one streamed chunk to the in-progress reply, in emission order.
    ///
    /// Returns false (and leaves the transcript untouched) when no reply is
    /// being streamed.
    pub fn append_chunk(&mut self, delta: &str) -> bool {
        match self.messages.last_mut() {
            Some(msg) if msg.is_streaming() => {
                msg.content.push_str(delta);
                true
            }
            _ => {
                tracing::warn!("transcript: append_chunk without an open reply");
                false
            }
        }
    }

    /// Mark the in-progress reply complete. The accumulated concatenation of
    /// chunks becomes the permanent entry.
    pub fn finalize_reply(&mut self) -> bool {
        match self.messages.last_mut() {
            Some(msg) if msg.is_streaming() => {
                msg.status = MessageStatus::Complete;
                true
            }
            _ => false,
        }
    }

    /// Mark the in-progress reply aborted, keeping every chunk already
    /// received. Partial output stays visible, flagged as partial.
    pub fn abort_reply(&mut self) -> bool {
        match self.messages.last_mut() {
            Some(msg) if msg.is_streaming() => {
                tracing::warn!(partial_chars = msg.content.len(), "transcript: reply aborted");
                msg.status = MessageStatus::Aborted;
                true
            }
            _ => false,
        }
    }
}
