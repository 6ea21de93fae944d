//! Session error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Fatal: no tokenizer means no session can be served.
    #[error(transparent)]
    Tokenizer(#[from] prompt_system::TokenizerError),

    /// The assembled prompt reached the token ceiling. Recoverable: the user
    /// must reset or trim history before retrying.
    #[error("{reason}")]
    BudgetExceeded {
        tokens: usize,
        limit: usize,
        reason: String,
        recovery: String,
    },

    /// A generation is already streaming for this session.
    #[error("a generation is already in flight")]
    Busy,

    /// The transcript does not call for a generation (last entry already
    /// ends the turn).
    #[error("the transcript does not call for a generation")]
    NotPending,

    #[error(transparent)]
    Mode(#[from] chat_state::ModeError),

    #[error(transparent)]
    Generation(#[from] replicate_client::GenerationError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
