// storage/mod.rs — SQLite task store.
//
// Owns task identity, ordering, and field validation, plus the goals
// singleton. WAL journal with synchronous=FULL: every mutation is committed
// and fsynced before the call returns. All mutations are serialized through
// one async mutex so concurrent requests cannot interleave mid-statement.

use anyhow::{anyhow, Context as _, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::debug;

use crate::tasks::{GoalLevel, Goals, Task, TaskPatch, TaskStatus, TimeHorizon};

const DB_FILE: &str = "chored.db";

#[derive(Debug, Clone, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    /// JSON array of strings, e.g. `["errands","phone"]`.
    tags: String,
    time_horizon: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            tags: serde_json::from_str(&self.tags)
                .with_context(|| format!("task {} has malformed tags", self.id))?,
            time_horizon: self.time_horizon.parse()?,
            status: self.status.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct GoalsRow {
    right_now: String,
    weekly: String,
    quarterly: String,
}

pub struct Storage {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open (or create) the database under `data_dir` and run migrations.
    /// Called once, eagerly, before the server starts accepting requests.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join(DB_FILE);
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Full)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        sqlx::migrate!("src/storage/migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    // ─── Tasks ────────────────────────────────────────────────────────────────

    /// All tasks, ascending id.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TaskRow::into_task).transpose()
    }

    /// Insert a task and return the full created record.
    pub async fn insert_task(
        &self,
        title: &str,
        description: Option<&str>,
        tags: &[String],
        time_horizon: TimeHorizon,
    ) -> Result<Task> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now().to_rfc3339();
        let tags_json = serde_json::to_string(tags)?;
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, tags, time_horizon, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(description)
        .bind(&tags_json)
        .bind(time_horizon.as_str())
        .bind(TaskStatus::Active.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_task(id)
            .await?
            .ok_or_else(|| anyhow!("task not found after insert"))
    }

    /// Apply only the fields present in `patch`; an empty patch is a no-op.
    /// A miss on `id` is a silent no-op (logged at debug) — the next prompt
    /// render shows the model the real task list again.
    pub async fn update_task(&self, id: i64, patch: TaskPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let mut sets: Vec<&str> = Vec::new();
        let mut vals: Vec<String> = Vec::new();
        if let Some(title) = patch.title {
            sets.push("title = ?");
            vals.push(title);
        }
        if let Some(description) = patch.description {
            sets.push("description = ?");
            vals.push(description);
        }
        if let Some(tags) = patch.tags {
            sets.push("tags = ?");
            vals.push(serde_json::to_string(&tags)?);
        }
        if let Some(horizon) = patch.time_horizon {
            sets.push("time_horizon = ?");
            vals.push(horizon.as_str().to_string());
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            vals.push(status.as_str().to_string());
        }
        sets.push("updated_at = ?");
        vals.push(Utc::now().to_rfc3339());

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        for val in &vals {
            query = query.bind(val);
        }
        let result = query.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            debug!(id, "update matched no task");
        }
        Ok(())
    }

    pub async fn complete_task(&self, id: i64) -> Result<()> {
        self.update_task(
            id,
            TaskPatch {
                status: Some(TaskStatus::Done),
                ..TaskPatch::default()
            },
        )
        .await
    }

    /// Hard delete. Idempotent — deleting a missing id is a no-op.
    pub async fn delete_task(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Goals ────────────────────────────────────────────────────────────────

    pub async fn get_goals(&self) -> Result<Goals> {
        let row: Option<GoalsRow> =
            sqlx::query_as("SELECT right_now, weekly, quarterly FROM goals WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row
            .map(|r| Goals {
                right_now: r.right_now,
                weekly: r.weekly,
                quarterly: r.quarterly,
            })
            .unwrap_or_default())
    }

    /// Replace one goal level wholesale. Empty content clears the level.
    pub async fn set_goal(&self, level: GoalLevel, content: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let sql = match level {
            GoalLevel::RightNow => {
                "INSERT INTO goals (id, right_now) VALUES (1, ?)
                 ON CONFLICT(id) DO UPDATE SET right_now = excluded.right_now"
            }
            GoalLevel::Weekly => {
                "INSERT INTO goals (id, weekly) VALUES (1, ?)
                 ON CONFLICT(id) DO UPDATE SET weekly = excluded.weekly"
            }
            GoalLevel::Quarterly => {
                "INSERT INTO goals (id, quarterly) VALUES (1, ?)
                 ON CONFLICT(id) DO UPDATE SET quarterly = excluded.quarterly"
            }
        };
        sqlx::query(sql).bind(content).execute(&self.pool).await?;
        Ok(())
    }
}
