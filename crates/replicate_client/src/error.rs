//! Client error taxonomy.
//!
//! `Transport` covers failures before the first chunk (no partial reply
//! exists); `Truncated` covers failures mid-stream, after which the caller
//! must keep the chunks it already consumed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("stream truncated: {0}")]
    Truncated(String),

    #[error("invalid sampling parameters: {0}")]
    InvalidParams(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
