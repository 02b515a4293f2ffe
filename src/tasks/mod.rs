// tasks/mod.rs — Task domain types and the model-derived operation variants.

pub mod apply;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Time horizon ─────────────────────────────────────────────────────────────

/// Informal urgency bucket used for default ordering absent explicit goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Today,
    ThisWeek,
    ThisMonth,
    Later,
    Someday,
}

impl Default for TimeHorizon {
    fn default() -> Self {
        Self::Later
    }
}

impl TimeHorizon {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
            Self::Later => "later",
            Self::Someday => "someday",
        }
    }
}

impl fmt::Display for TimeHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeHorizon {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "this_week" => Ok(Self::ThisWeek),
            "this_month" => Ok(Self::ThisMonth),
            "later" => Ok(Self::Later),
            "someday" => Ok(Self::Someday),
            other => Err(anyhow::anyhow!("unknown time horizon '{other}'")),
        }
    }
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Done,
    Waiting,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Done => "done",
            Self::Waiting => "waiting",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "done" => Ok(Self::Done),
            "waiting" => Ok(Self::Waiting),
            other => Err(anyhow::anyhow!("unknown task status '{other}'")),
        }
    }
}

// ─── Task ─────────────────────────────────────────────────────────────────────

/// A single task record. `id` is assigned by the store, immutable, and never
/// reused. Timestamps are RFC-3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Insertion order preserved for display.
    pub tags: Vec<String>,
    pub time_horizon: TimeHorizon,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update applied to an existing task. Absent fields are left
/// untouched; an all-`None` patch is a no-op at the store.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub time_horizon: Option<TimeHorizon>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.time_horizon.is_none()
            && self.status.is_none()
    }
}

// ─── Goals ────────────────────────────────────────────────────────────────────

/// Three-tier priority hierarchy biasing the model's recommendations.
/// Empty string means unset. Each field is replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub right_now: String,
    pub weekly: String,
    pub quarterly: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalLevel {
    RightNow,
    Weekly,
    Quarterly,
}

impl GoalLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RightNow => "right_now",
            Self::Weekly => "weekly",
            Self::Quarterly => "quarterly",
        }
    }
}

// ─── Chat messages ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ─── Operations ───────────────────────────────────────────────────────────────

/// A declarative instruction extracted from the model's reply.
///
/// Operations are ephemeral: decoded from the TASK_OPS block, executed once
/// in order, and discarded. Each variant carries only the fields relevant to
/// its tag; elements that fail to decode are dropped upstream (the model is
/// probabilistic, partial progress beats all-or-nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TaskOperation {
    Add {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_horizon: Option<TimeHorizon>,
    },
    Update {
        id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_horizon: Option<TimeHorizon>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<TaskStatus>,
    },
    Complete {
        id: i64,
    },
    Delete {
        id: i64,
    },
    SetGoals {
        level: GoalLevel,
        content: String,
    },
}
