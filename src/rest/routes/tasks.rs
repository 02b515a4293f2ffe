// rest/routes/tasks.rs — task listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::tasks::Task;
use crate::AppContext;

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<TasksResponse>, ApiError> {
    let tasks = ctx.storage.list_tasks().await?;
    Ok(Json(TasksResponse { tasks }))
}
