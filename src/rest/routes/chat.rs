// rest/routes/chat.rs — the conversation orchestrator.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::chat::{cap_history, parser, prompt};
use crate::error::ApiError;
use crate::tasks::{apply, ChatMessage, Task};
use crate::AppContext;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub tasks: Vec<Task>,
}

/// POST /chat. One request flows one direction: prompt render → model call
/// → parse → apply → store re-read. The task list in the response comes
/// from the store after the operations landed, never from in-memory
/// assumptions.
pub async fn chat(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::Validation("Message is required".to_string()))?
        .to_string();
    let history: Vec<ChatMessage> = match body.get("history") {
        None | Some(Value::Null) => Vec::new(),
        Some(history) => serde_json::from_value(history.clone()).map_err(|_| {
            ApiError::Validation("history must be an array of {role, content} messages".to_string())
        })?,
    };

    let tasks = ctx.storage.list_tasks().await?;
    let goals = ctx.storage.get_goals().await?;
    let system = prompt::build(&tasks, &goals, Utc::now());

    let mut messages: Vec<ChatMessage> = cap_history(&history).to_vec();
    messages.push(ChatMessage::user(message));

    let text = ctx.model.complete(&system, &messages).await?;
    let parsed = parser::parse(&text);

    if !parsed.operations.is_empty() {
        info!(count = parsed.operations.len(), "applying task operations");
        apply::apply(&ctx.storage, parsed.operations).await?;
    }

    let tasks = ctx.storage.list_tasks().await?;
    Ok(Json(ChatResponse {
        reply: parsed.reply,
        tasks,
    }))
}
