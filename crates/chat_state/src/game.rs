//! Guessing game - secret matching over user input
//!
//! The game inspects each user message for the active secret. A successful
//! guess records the secret, unlocks a rule, advances to the next secret in
//! the fixed progression, and tells the caller to replace the transcript with
//! a single gamemaster announcement. Evaluation is pure: the current state is
//! never mutated in place.

use serde::{Deserialize, Serialize};

/// Fixed secret progression. After the final secret is guessed the game is
/// terminal-idle: no further input matches and no state changes.
pub const SECRET_PROGRESSION: &[&str] = &["arctic", "snowflake"];

/// Marker appended to the rule list on every successful guess.
const NEW_RULE_MARKER: &str = "A";

/// Outcome of evaluating one user message against the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    /// The active secret was found. `next` is the advanced state and
    /// `announcement` the gamemaster message that replaces the transcript.
    Match {
        next: GameState,
        announcement: String,
    },
    /// No secret present (or game already terminal); nothing changes.
    NoMatch,
}

/// Guessing-game state.
///
/// `guessed` only grows, and only ever by the secret that was active at match
/// time. `secret` is `None` once the progression is exhausted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    secret: Option<String>,
    guessed: Vec<String>,
    rules: Vec<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh game at the start of the progression.
    pub fn new() -> Self {
        Self {
            secret: Some(SECRET_PROGRESSION[0].to_string()),
            guessed: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// The secret currently being guessed, `None` once the game is terminal.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn guessed(&self) -> &[String] {
        &self.guessed
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn is_terminal(&self) -> bool {
        self.secret.is_none()
    }

    /// Check one user message against the active secret.
    ///
    /// The match is case-sensitive substring containment, nothing fuzzier:
    /// "my password is arctic" matches the secret "arctic", "ARCTIC" does not.
    pub fn evaluate(&self, user_text: &str) -> GameOutcome {
        let Some(secret) = self.secret.as_deref() else {
            return GameOutcome::NoMatch;
        };
        if !user_text.contains(secret) {
            return GameOutcome::NoMatch;
        }

        let mut next = self.clone();
        next.guessed.push(secret.to_string());
        next.rules.push(NEW_RULE_MARKER.to_string());
        next.secret = next_secret(secret);

        tracing::info!(
            guessed = secret,
            remaining = next.secret.as_deref().unwrap_or("<none>"),
            "guessing game: secret matched"
        );

        let announcement = format!("Correct guess! The password '{secret}' was found.");
        GameOutcome::Match { next, announcement }
    }

    /// Return to the start of the progression. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn next_secret(current: &str) -> Option<String> {
    SECRET_PROGRESSION
        .iter()
        .position(|s| *s == current)
        .and_then(|i| SECRET_PROGRESSION.get(i + 1))
        .map(|s| s.to_string())
}
