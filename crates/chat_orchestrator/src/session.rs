//! ChatSession - explicit per-session state and the turn loop.
//!
//! All state lives in this value; nothing is process-global except the cached
//! tokenizer handle. Two sessions in one process share nothing mutable.

use std::sync::Arc;

use chat_core::{Message, Transcript};
use chat_state::{
    GameOutcome, GameState, InactivityClock, ModeChange, SessionMode, SessionModes,
};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use prompt_system::{assemble, shared_counter, BudgetGate, GateDecision};
use replicate_client::{GenerationClient, GenerationParams};
use tokio_util::sync::CancellationToken;

use crate::config::{ModeNoticeStyle, SessionConfig};
use crate::error::{Result, SessionError};

/// Notice appended when the timeout mode ends an idle session.
pub const SESSION_TIMEOUT_NOTICE: &str =
    "Session timed out due to inactivity. Send a new message to continue.";

/// What happened to a submitted user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Appended to the transcript; a generation should follow.
    Queued,
    /// The guessing game consumed the input and replaced the transcript with
    /// its announcement. No generation follows.
    GameMatched { announcement: String },
}

/// How a generation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    Complete,
    /// Cancelled by the caller; the chunks consumed so far were kept and the
    /// reply is marked aborted.
    Cancelled,
}

/// Statistics for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    pub outcome: GenerationOutcome,
    pub chunks: usize,
    pub chars: usize,
}

/// One conversational session: transcript, game, modes, clock, and the
/// single-generation busy flag, behind one owned value.
pub struct ChatSession {
    config: SessionConfig,
    client: Arc<dyn GenerationClient>,
    gate: BudgetGate,
    transcript: Transcript,
    game: GameState,
    modes: SessionModes,
    clock: InactivityClock,
    busy: bool,
}

impl ChatSession {
    /// Build a session. Pays (or reuses) the one-time tokenizer
    /// initialization; a tokenizer failure is fatal for the whole process.
    pub fn new(config: SessionConfig, client: Arc<dyn GenerationClient>) -> Result<Self> {
        let counter = shared_counter(&config.tokenizer_model)?;
        let gate = BudgetGate::new(counter, config.token_limit);
        Ok(Self {
            transcript: Transcript::with_greeting(config.greeting.clone()),
            game: GameState::new(),
            modes: SessionModes::new(config.features),
            clock: InactivityClock::new(Utc::now()),
            busy: false,
            gate,
            config,
            client,
        })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn modes(&self) -> &SessionModes {
        &self.modes
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the last transcript entry calls for a model reply.
    pub fn needs_generation(&self) -> bool {
        self.transcript.wants_reply()
    }

    /// Feed one user message through the game and into the transcript.
    ///
    /// Runs the guessing game first (when enabled): a match replaces the
    /// whole transcript with the gamemaster announcement and short-circuits
    /// generation. Otherwise the message is appended, labeled anonymous when
    /// that mode is active at submission time.
    pub fn submit_user_input(&mut self, text: &str) -> Result<SubmitOutcome> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        self.clock.touch(Utc::now());

        if self.modes.features().game {
            if let GameOutcome::Match { next, announcement } = self.game.evaluate(text) {
                self.game = next;
                self.transcript
                    .replace_with(Message::gamemaster(announcement.clone()));
                return Ok(SubmitOutcome::GameMatched { announcement });
            }
        }

        self.transcript
            .push(Message::user(text, self.modes.anonymous()));
        Ok(SubmitOutcome::Queued)
    }

    /// Run one generation: assemble, gate, stream, fold.
    ///
    /// The budget gate runs strictly before the network call; on rejection
    /// nothing is dispatched and the transcript is untouched. Streamed chunks
    /// are folded into the transcript in emission order and echoed to
    /// `on_chunk`. A mid-stream failure keeps the partial reply (marked
    /// aborted) and surfaces as an error; cancellation keeps the partial
    /// reply and returns a `Cancelled` summary.
    pub async fn generate<F>(
        &mut self,
        params: &GenerationParams,
        cancel: &CancellationToken,
        mut on_chunk: F,
    ) -> Result<GenerationSummary>
    where
        F: FnMut(&str),
    {
        if self.busy {
            return Err(SessionError::Busy);
        }
        if !self.transcript.wants_reply() {
            return Err(SessionError::NotPending);
        }

        let prompt = assemble(&self.transcript);
        match self.gate.check(&prompt) {
            GateDecision::Allowed { tokens } => {
                tracing::debug!(tokens, "prompt admitted by budget gate");
            }
            GateDecision::Rejected {
                tokens,
                limit,
                reason,
                recovery,
            } => {
                return Err(SessionError::BudgetExceeded {
                    tokens,
                    limit,
                    reason,
                    recovery,
                });
            }
        }

        self.busy = true;
        let result = self.run_stream(&prompt, params, cancel, &mut on_chunk).await;
        self.busy = false;
        result
    }

    async fn run_stream(
        &mut self,
        prompt: &str,
        params: &GenerationParams,
        cancel: &CancellationToken,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<GenerationSummary> {
        // Transport/API failures happen here, before any chunk exists; the
        // transcript has no reply to clean up.
        let mut stream = self.client.stream_generation(prompt, params).await?;

        self.transcript.begin_reply();
        let mut chunks = 0usize;
        let mut chars = 0usize;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.transcript.abort_reply();
                    tracing::info!(chunks, chars, "generation cancelled");
                    return Ok(GenerationSummary {
                        outcome: GenerationOutcome::Cancelled,
                        chunks,
                        chars,
                    });
                }
                item = stream.next() => match item {
                    Some(Ok(chunk)) => {
                        self.transcript.append_chunk(&chunk);
                        on_chunk(&chunk);
                        chunks += 1;
                        chars += chunk.len();
                    }
                    Some(Err(e)) => {
                        // keep what already arrived, visibly partial
                        self.transcript.abort_reply();
                        return Err(e.into());
                    }
                    None => {
                        self.transcript.finalize_reply();
                        tracing::info!(chunks, chars, "generation complete");
                        return Ok(GenerationSummary {
                            outcome: GenerationOutcome::Complete,
                            chunks,
                            chars,
                        });
                    }
                },
            }
        }
    }

    /// Flip a session mode, surfacing the notification per configuration.
    pub fn toggle_mode(&mut self, mode: SessionMode) -> Result<ModeChange> {
        let change = self.modes.toggle(mode)?;
        if self.config.mode_notice_style == ModeNoticeStyle::Persistent {
            self.transcript.push(Message::assistant(change.notice.clone()));
        }
        Ok(change)
    }

    /// Evaluate the inactivity timeout.
    ///
    /// Only acts while the timeout mode is active and no generation is
    /// streaming. On timeout a notice enters the transcript; because the
    /// notice is assistant-authored, no auto-generation follows until new
    /// user input arrives.
    pub fn check_inactivity(&mut self, now: DateTime<Utc>) -> bool {
        if self.busy {
            return false;
        }
        if !self.modes.is_active(SessionMode::Timeout) {
            // keep the clock fresh so enabling the mode later does not
            // instantly time out
            self.clock.touch(now);
            return false;
        }
        let timed_out = self.clock.check(now, self.config.inactivity_threshold);
        if timed_out {
            tracing::info!("session timed out due to inactivity");
            self.transcript.push(Message::assistant(SESSION_TIMEOUT_NOTICE));
        }
        timed_out
    }

    /// Drop all conversation turns, keeping game and mode state.
    pub fn clear_history(&mut self) {
        self.transcript.reset();
    }

    /// Return the guessing game to the start of its progression.
    pub fn reset_game(&mut self) {
        self.game.reset();
    }

    /// Atomically reinitialize the whole session: transcript, game, modes,
    /// and clock return to their initial values. Idempotent.
    pub fn reset(&mut self) {
        self.transcript.reset();
        self.game.reset();
        self.modes.reset();
        self.clock.touch(Utc::now());
        self.busy = false;
    }
}
