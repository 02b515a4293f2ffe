// tasks/apply.rs — applies model-derived operations to the store, in order.

use anyhow::Result;
use tracing::debug;

use crate::storage::Storage;
use crate::tasks::{TaskOperation, TaskPatch};

/// Execute `operations` strictly in order; each effect is visible to the
/// next. Semantically invalid operations (blank title, unknown id) are
/// skipped rather than aborting the batch — the operations come from
/// probabilistic model output and partial progress beats rollback.
/// Persistence errors propagate; there is no atomicity across the batch.
pub async fn apply(storage: &Storage, operations: Vec<TaskOperation>) -> Result<()> {
    for op in operations {
        match op {
            TaskOperation::Add {
                title,
                description,
                tags,
                time_horizon,
            } => {
                let title = title.trim();
                if title.is_empty() {
                    debug!("skipping add with blank title");
                    continue;
                }
                storage
                    .insert_task(
                        title,
                        description.as_deref(),
                        &tags.unwrap_or_default(),
                        time_horizon.unwrap_or_default(),
                    )
                    .await?;
            }
            TaskOperation::Update {
                id,
                title,
                description,
                tags,
                time_horizon,
                status,
            } => {
                storage
                    .update_task(
                        id,
                        TaskPatch {
                            title,
                            description,
                            tags,
                            time_horizon,
                            status,
                        },
                    )
                    .await?;
            }
            TaskOperation::Complete { id } => storage.complete_task(id).await?,
            TaskOperation::Delete { id } => storage.delete_task(id).await?,
            TaskOperation::SetGoals { level, content } => {
                storage.set_goal(level, &content).await?;
            }
        }
    }
    Ok(())
}
