// chat/parser.rs — extracts the structured-operation block from a model reply.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::tasks::TaskOperation;

pub const OPS_START: &str = "<<<TASK_OPS>>>";
pub const OPS_END: &str = "<<<END_TASK_OPS>>>";

// Non-greedy interior; the block cannot contain the end marker (no escaping
// mechanism exists).
static OPS_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<<<TASK_OPS>>>\s*(.*?)\s*<<<END_TASK_OPS>>>").expect("static pattern")
});

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub reply: String,
    pub operations: Vec<TaskOperation>,
}

/// Split a model reply into conversational text and structured operations.
///
/// Never fails the exchange: a missing block means the whole text is the
/// reply and there are no operations; malformed JSON inside the block
/// degrades to no operations with the block still stripped from the reply.
/// Only the first delimited region is honored.
pub fn parse(text: &str) -> ParsedReply {
    let Some(caps) = OPS_BLOCK.captures(text) else {
        return ParsedReply {
            reply: text.trim().to_string(),
            operations: Vec::new(),
        };
    };

    let reply = OPS_BLOCK.replace(text, "").trim().to_string();
    let interior = caps.get(1).map_or("", |m| m.as_str());
    ParsedReply {
        reply,
        operations: decode_operations(interior),
    }
}

fn decode_operations(raw: &str) -> Vec<TaskOperation> {
    let items: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(err) => {
            debug!(%err, "TASK_OPS block is not a JSON array");
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<TaskOperation>(item) {
            Ok(op) => Some(op),
            Err(err) => {
                debug!(%err, "dropping operation with unknown or incomplete shape");
                None
            }
        })
        .collect()
}
