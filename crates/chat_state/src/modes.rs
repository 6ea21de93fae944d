//! Session modes - independent boolean behavior toggles
//!
//! Each mode is edge-triggered: one [`SessionModes::toggle`] call flips the
//! state exactly once and yields exactly one [`ModeChange`] describing the new
//! state. How that notification is surfaced (transient event vs persisted
//! transcript message) is the caller's choice.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The toggleable session behaviors.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// User messages are treated as sensitive by the surrounding UI.
    Privacy,
    /// The next user messages are labeled with the anonymous role.
    Anonymity,
    /// Inactivity ends the session for generation-triggering purposes.
    Timeout,
}

impl SessionMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Privacy => "privacy",
            Self::Anonymity => "anonymity",
            Self::Timeout => "timeout",
        }
    }
}

/// Error type for mode operations.
///
/// Boolean toggles cannot transition invalidly; the only defensive case is a
/// toggle on a mode the session configuration never enabled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("mode '{}' is not enabled for this session", .0.label())]
    FeatureDisabled(SessionMode),
}

/// Feature flags selecting which behaviors a session carries.
///
/// The three historical controller variants (game, anonymity, timeout) are one
/// controller behind this configuration.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionFeatures {
    #[serde(default = "default_true")]
    pub game: bool,
    #[serde(default = "default_true")]
    pub anonymity: bool,
    #[serde(default = "default_true")]
    pub timeout: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SessionFeatures {
    fn default() -> Self {
        Self {
            game: true,
            anonymity: true,
            timeout: true,
        }
    }
}

/// Result of one toggle: the mode, its new state, and a human-readable notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChange {
    pub mode: SessionMode,
    pub active: bool,
    pub notice: String,
}

/// Per-session mode state. Reset only by an explicit session reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionModes {
    features: SessionFeatures,
    privacy: bool,
    anonymity: bool,
    timeout: bool,
}

impl SessionModes {
    pub fn new(features: SessionFeatures) -> Self {
        Self {
            features,
            privacy: false,
            anonymity: false,
            timeout: false,
        }
    }

    pub fn features(&self) -> SessionFeatures {
        self.features
    }

    pub fn is_active(&self, mode: SessionMode) -> bool {
        match mode {
            SessionMode::Privacy => self.privacy,
            SessionMode::Anonymity => self.anonymity,
            SessionMode::Timeout => self.timeout,
        }
    }

    /// Whether the next user message should carry the anonymous role.
    ///
    /// Toggling never relabels messages already in the transcript.
    pub fn anonymous(&self) -> bool {
        self.anonymity
    }

    /// Flip one mode. Emits exactly one [`ModeChange`] per call.
    pub fn toggle(&mut self, mode: SessionMode) -> Result<ModeChange, ModeError> {
        let enabled = match mode {
            SessionMode::Privacy => true,
            SessionMode::Anonymity => self.features.anonymity,
            SessionMode::Timeout => self.features.timeout,
        };
        if !enabled {
            return Err(ModeError::FeatureDisabled(mode));
        }

        let slot = match mode {
            SessionMode::Privacy => &mut self.privacy,
            SessionMode::Anonymity => &mut self.anonymity,
            SessionMode::Timeout => &mut self.timeout,
        };
        *slot = !*slot;
        let active = *slot;

        tracing::info!(mode = mode.label(), active, "session mode toggled");

        let notice = if active {
            format!("{} mode is now on.", capitalize(mode.label()))
        } else {
            format!("{} mode is now off.", capitalize(mode.label()))
        };

        Ok(ModeChange {
            mode,
            active,
            notice,
        })
    }

    /// Return every mode to its initial (inactive) state.
    pub fn reset(&mut self) {
        self.privacy = false;
        self.anonymity = false;
        self.timeout = false;
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
