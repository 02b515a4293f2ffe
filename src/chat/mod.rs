// chat/mod.rs — conversation framing shared by the chat endpoint.

pub mod parser;
pub mod prompt;

use crate::tasks::ChatMessage;

/// Maximum prior messages forwarded to the model. Older history is silently
/// dropped — no summarization.
pub const MAX_HISTORY: usize = 20;

/// The last `MAX_HISTORY` entries of the caller-supplied history.
pub fn cap_history(history: &[ChatMessage]) -> &[ChatMessage] {
    &history[history.len().saturating_sub(MAX_HISTORY)..]
}
