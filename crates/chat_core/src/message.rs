//! Message types - Roles, delivery status, and the message record itself

use serde::{Deserialize, Serialize};

/// Speaker role attached to each transcript entry.
///
/// `UserAnon` is a user message sent while anonymity mode is active; the wire
/// prompt treats it identically to `User`. `Gamemaster` entries are synthetic
/// guessing-game announcements and never trigger a model reply.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    User,
    UserAnon,
    Gamemaster,
}

impl Role {
    /// Whether this role represents user-authored input.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User | Self::UserAnon)
    }

    /// Roles that terminate a turn: a transcript ending in one of these does
    /// not trigger a new generation.
    pub fn ends_turn(&self) -> bool {
        matches!(self, Self::Assistant | Self::Gamemaster)
    }
}

/// Delivery status of a message.
///
/// Everything except an in-flight assistant reply is `Complete` from the
/// moment it is appended. A reply being streamed is `Streaming` until the
/// upstream closes; if the stream fails or is cancelled mid-flight the
/// already-received content is kept and the status becomes `Aborted` so the
/// partial reply is never presented as complete.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Complete,
    Streaming,
    Aborted,
}

/// One transcript entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub status: MessageStatus,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            status: MessageStatus::Complete,
        }
    }

    /// Create a user message, choosing the anonymous role when requested.
    pub fn user(content: impl Into<String>, anonymous: bool) -> Self {
        let role = if anonymous { Role::UserAnon } else { Role::User };
        Self::new(role, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn gamemaster(content: impl Into<String>) -> Self {
        Self::new(Role::Gamemaster, content)
    }

    /// An empty assistant reply about to receive streamed chunks.
    pub fn streaming_reply() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            status: MessageStatus::Streaming,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.status == MessageStatus::Streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_roles_are_user() {
        assert!(Role::User.is_user());
        assert!(Role::UserAnon.is_user());
        assert!(!Role::Assistant.is_user());
        assert!(!Role::Gamemaster.is_user());
    }

    #[test]
    fn turn_ending_roles() {
        assert!(Role::Assistant.ends_turn());
        assert!(Role::Gamemaster.ends_turn());
        assert!(!Role::User.ends_turn());
        assert!(!Role::UserAnon.ends_turn());
    }

    #[test]
    fn anonymous_flag_selects_role() {
        assert_eq!(Message::user("hi", false).role, Role::User);
        assert_eq!(Message::user("hi", true).role, Role::UserAnon);
    }

    #[test]
    fn status_defaults_to_complete_on_deserialize() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        assert_eq!(msg.status, MessageStatus::Complete);
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::UserAnon).unwrap();
        assert_eq!(json, r#""user_anon""#);
    }
}
