//! chat_core - Message and transcript types shared across the chat system
//!
//! The [`Transcript`] is the single shared data structure every other
//! component reads or appends to; all mutation goes through its methods.

pub mod message;
pub mod transcript;

pub use message::{Message, MessageStatus, Role};
pub use transcript::{Transcript, DEFAULT_GREETING};
