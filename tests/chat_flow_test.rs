//! End-to-end chat flow over the real router with a stub model backend.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use chored::chat::MAX_HISTORY;
use chored::config::Config;
use chored::provider::{ModelBackend, ProviderError};
use chored::rest::build_router;
use chored::storage::Storage;
use chored::tasks::{ChatMessage, GoalLevel};
use chored::AppContext;

/// Returns a canned reply and records what it was asked.
struct ScriptedBackend {
    reply: String,
    message_counts: Mutex<Vec<usize>>,
}

impl ScriptedBackend {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            message_counts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn complete(
        &self,
        _system: &str,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        self.message_counts.lock().unwrap().push(messages.len());
        Ok(self.reply.clone())
    }
}

struct FailingBackend {
    status: u16,
}

#[async_trait]
impl ModelBackend for FailingBackend {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        Err(ProviderError::Api {
            status: self.status,
            message: "Overloaded".to_string(),
        })
    }
}

async fn make_ctx(model: Arc<dyn ModelBackend>) -> (TempDir, Arc<AppContext>) {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(Storage::new(dir.path()).await.unwrap());
    let ctx = Arc::new(AppContext {
        config: Arc::new(Config::default()),
        storage,
        model,
        started_at: std::time::Instant::now(),
    });
    (dir, ctx)
}

async fn post_chat(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn chat_creates_a_task_from_model_operations() {
    let backend = ScriptedBackend::new(concat!(
        "Added it.",
        "<<<TASK_OPS>>>",
        r#"[{"op":"add","title":"Call the bank","time_horizon":"today","tags":["phone"]}]"#,
        "<<<END_TASK_OPS>>>"
    ));
    let (_dir, ctx) = make_ctx(backend).await;
    let router = build_router(ctx.clone());

    let (status, body) = post_chat(
        router.clone(),
        json!({ "message": "remind me to call the bank tomorrow" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Added it.");
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["tasks"][0]["title"], "Call the bank");
    assert_eq!(body["tasks"][0]["time_horizon"], "today");
    assert_eq!(body["tasks"][0]["status"], "active");

    // The response reflects durable store state.
    let (status, body) = get_json(router, "/tasks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn plain_reply_leaves_the_store_untouched() {
    let backend = ScriptedBackend::new("Sounds like a good day so far.");
    let (_dir, ctx) = make_ctx(backend).await;
    let router = build_router(ctx);

    let (status, body) = post_chat(router, json!({ "message": "how am I doing?" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Sounds like a good day so far.");
    assert!(body["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_ops_block_degrades_to_a_plain_reply() {
    let backend = ScriptedBackend::new(
        "Done!<<<TASK_OPS>>>[{\"op\":\"add\",\"title\":\"x\"<<<END_TASK_OPS>>>",
    );
    let (_dir, ctx) = make_ctx(backend).await;
    let router = build_router(ctx);

    let (status, body) = post_chat(router, json!({ "message": "add x" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Done!");
    assert!(body["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn set_goals_updates_the_singleton_and_not_the_tasks() {
    let backend = ScriptedBackend::new(concat!(
        "Noted — that's the focus now.",
        "<<<TASK_OPS>>>",
        r#"[{"op":"set_goals","level":"right_now","content":"Land the release"}]"#,
        "<<<END_TASK_OPS>>>"
    ));
    let (_dir, ctx) = make_ctx(backend).await;
    let router = build_router(ctx.clone());

    let (status, body) =
        post_chat(router, json!({ "message": "my top priority is landing the release" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tasks"].as_array().unwrap().is_empty());

    let goals = ctx.storage.get_goals().await.unwrap();
    assert_eq!(goals.right_now, "Land the release");
    assert_eq!(goals.weekly, "");

    // And the next level replaces independently.
    ctx.storage
        .set_goal(GoalLevel::Weekly, "Clear the backlog")
        .await
        .unwrap();
    assert_eq!(
        ctx.storage.get_goals().await.unwrap().right_now,
        "Land the release"
    );
}

#[tokio::test]
async fn history_is_capped_at_twenty_messages() {
    let backend = ScriptedBackend::new("ok");
    let (_dir, ctx) = make_ctx(backend.clone()).await;
    let router = build_router(ctx);

    let history: Vec<Value> = (0..25)
        .map(|i| json!({ "role": "user", "content": format!("m{i}") }))
        .collect();
    let (status, _) = post_chat(
        router,
        json!({ "message": "latest", "history": history }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let counts = backend.message_counts.lock().unwrap();
    // 20 capped history entries plus the new user message.
    assert_eq!(counts.as_slice(), &[MAX_HISTORY + 1]);
}

#[tokio::test]
async fn missing_message_is_a_400() {
    let backend = ScriptedBackend::new("unused");
    let (_dir, ctx) = make_ctx(backend).await;
    let router = build_router(ctx);

    let (status, body) = post_chat(router.clone(), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");

    let (status, _) = post_chat(router, json!({ "message": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_history_is_a_400() {
    let backend = ScriptedBackend::new("unused");
    let (_dir, ctx) = make_ctx(backend).await;
    let router = build_router(ctx);

    let (status, _) = post_chat(
        router,
        json!({ "message": "hi", "history": [{ "role": "narrator", "content": "x" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_error_passes_through_status_and_message() {
    let (_dir, ctx) = make_ctx(Arc::new(FailingBackend { status: 429 })).await;
    let router = build_router(ctx);

    let (status, body) = post_chat(router, json!({ "message": "hello" })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Overloaded");
}

#[tokio::test]
async fn tasks_endpoint_lists_directly_from_the_store() {
    let backend = ScriptedBackend::new("unused");
    let (_dir, ctx) = make_ctx(backend).await;
    ctx.storage
        .insert_task("pre-existing", None, &[], Default::default())
        .await
        .unwrap();
    let router = build_router(ctx);

    let (status, body) = get_json(router, "/tasks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["tasks"][0]["title"], "pre-existing");
}

#[tokio::test]
async fn health_reports_liveness() {
    let backend = ScriptedBackend::new("unused");
    let (_dir, ctx) = make_ctx(backend).await;
    let router = build_router(ctx);

    let (status, body) = get_json(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "chored");
}
