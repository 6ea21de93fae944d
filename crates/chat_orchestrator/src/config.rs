//! Session configuration.

use chat_core::DEFAULT_GREETING;
use chat_state::SessionFeatures;
use chrono::Duration;
use prompt_system::DEFAULT_TOKEN_LIMIT;
use serde::{Deserialize, Serialize};

/// How a mode toggle is surfaced to the user.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModeNoticeStyle {
    /// The change is returned to the caller only; nothing enters the
    /// transcript.
    #[default]
    Transient,
    /// The notice is additionally appended to the transcript as an
    /// assistant message.
    Persistent,
}

/// Per-session behavior configuration.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Assistant greeting seeding the transcript.
    pub greeting: String,
    /// Which optional behaviors this session carries.
    pub features: SessionFeatures,
    /// Token ceiling enforced by the budget gate.
    pub token_limit: usize,
    /// Model name resolved to a pretrained BPE encoding.
    pub tokenizer_model: String,
    /// Surfacing of mode-toggle notifications.
    pub mode_notice_style: ModeNoticeStyle,
    /// Inactivity threshold for the timeout mode.
    pub inactivity_threshold: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            features: SessionFeatures::default(),
            token_limit: DEFAULT_TOKEN_LIMIT,
            tokenizer_model: "gpt-3.5-turbo".to_string(),
            mode_notice_style: ModeNoticeStyle::default(),
            inactivity_threshold: Duration::seconds(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = SessionConfig::default();
        assert_eq!(config.token_limit, 3072);
        assert_eq!(config.greeting, DEFAULT_GREETING);
        assert_eq!(config.mode_notice_style, ModeNoticeStyle::Transient);
        assert!(config.features.game);
    }
}
