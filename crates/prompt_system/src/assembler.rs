//! Wire-prompt assembly.
//!
//! The downstream model only knows two speakers: user roles map to a `user`
//! frame, every other role (assistant, gamemaster) folds into an `assistant`
//! frame. A trailing open assistant frame plus an empty line prompts the model
//! to continue the conversation.

use chat_core::Transcript;

pub const IM_START: &str = "<|im_start|>";
pub const IM_END: &str = "<|im_end|>";

/// Render the transcript into the wire format.
///
/// Pure function of transcript content and order; one frame per message,
/// frames joined with a single newline.
pub fn assemble(transcript: &Transcript) -> String {
    let mut frames = Vec::with_capacity(transcript.len() + 2);
    for message in transcript.messages() {
        let speaker = if message.role.is_user() { "user" } else { "assistant" };
        frames.push(format!("{IM_START}{speaker}\n{}{IM_END}", message.content));
    }
    frames.push(format!("{IM_START}assistant"));
    frames.push(String::new());
    frames.join("\n")
}
