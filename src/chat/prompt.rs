// chat/prompt.rs — renders tasks, goals, and the behavioral contract into
// the system prompt. Pure — no I/O, no side effects.

use chrono::{DateTime, Utc};

use crate::tasks::{Goals, Task, TaskStatus};

/// Fixed behavioral policy sent with every request. This text is the
/// contract between the daemon and the model; changing it changes how the
/// assistant captures, deduplicates, and prioritizes.
const BEHAVIOR_RULES: &str = r#"## Your Behavior

- Be conversational and concise. Acknowledge what you did briefly — don't enumerate every field you set.
- When the user mentions something that sounds like a task, add it. Don't ask for confirmation unless genuinely ambiguous.
- Synthesize messy input into clean task titles. The user might ramble — distill it.
- Before adding a task, scan the current list for one that already covers it; update that task instead of creating a duplicate.
- Tell a check-in apart from planning: "what's next?" or "how am I doing?" wants a recommendation from the existing list, not new tasks. Planning talk wants capture.
- When recommending, prefer tasks serving the "right now" goal, then the weekly goal, then the quarterly goal, then order by time horizon (today > this_week > this_month > later > someday).
- If the user names a hard date or deadline ("by Friday", "before the trip"), pick the tightest time_horizon that fits and keep the deadline in the description.
- Only change goals when the user explicitly states a new priority. Never infer a goal change from ordinary task chatter."#;

/// Fixed instructions for emitting the structured-operation block. The
/// markers must match what the response parser looks for.
const OPS_PROTOCOL: &str = r#"## Task Operations

After your conversational response, if any tasks or goals need to change, output a JSON block wrapped in delimiters like this:

<<<TASK_OPS>>>
[
  {"op": "add", "title": "Task title", "description": "Optional detail", "tags": ["tag1"], "time_horizon": "today"},
  {"op": "update", "id": 1, "title": "New title", "time_horizon": "this_week"},
  {"op": "complete", "id": 2},
  {"op": "delete", "id": 3},
  {"op": "set_goals", "level": "weekly", "content": "Ship the report draft"}
]
<<<END_TASK_OPS>>>

Rules for operations:
- "add": requires "title". Optional: "description", "tags" (array), "time_horizon" (today|this_week|this_month|later|someday).
- "update": requires "id". Include only the fields to change. May also set "status" (active|done|waiting).
- "complete": requires "id". Marks a task as done.
- "delete": requires "id". Permanently removes a task.
- "set_goals": requires "level" (right_now|weekly|quarterly) and "content". Replaces that goal level entirely.

Only include the TASK_OPS block if you need to make changes. If the user is just chatting, respond without it.
Time horizons: today, this_week, this_month, later, someday.
Statuses: active, done, waiting."#;

/// Build the full system prompt from the current store state.
pub fn build(tasks: &[Task], goals: &Goals, now: DateTime<Utc>) -> String {
    format!(
        "You are a task management assistant. You help the user capture, organize, and track \
         their tasks through natural conversation.\n\n\
         Today's date: {date}.\n\n\
         ## Current Goals\n\n\
         Right now: {right_now}\n\
         This week: {weekly}\n\
         This quarter: {quarterly}\n\n\
         ## Current Tasks\n\n\
         {tasks}\n\n\
         {behavior}\n\n\
         {protocol}",
        date = now.format("%A, %B %-d, %Y"),
        right_now = goal_line(&goals.right_now),
        weekly = goal_line(&goals.weekly),
        quarterly = goal_line(&goals.quarterly),
        tasks = task_section(tasks),
        behavior = BEHAVIOR_RULES,
        protocol = OPS_PROTOCOL,
    )
}

fn goal_line(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        "(not set)"
    } else {
        trimmed
    }
}

fn task_section(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks yet.".to_string();
    }

    // Status groups in fixed order: active, waiting, recently completed.
    let groups = [
        ("Active tasks:", TaskStatus::Active),
        ("Waiting tasks:", TaskStatus::Waiting),
        ("Recently completed:", TaskStatus::Done),
    ];

    groups
        .iter()
        .filter_map(|(label, status)| {
            let rendered: Vec<String> = tasks
                .iter()
                .filter(|t| t.status == *status)
                .map(format_task)
                .collect();
            if rendered.is_empty() {
                None
            } else {
                Some(format!("{label}\n{}", rendered.join("\n")))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_task(task: &Task) -> String {
    let mut lines = vec![format!(
        "  [{}] {} ({})",
        task.id, task.title, task.time_horizon
    )];
    if let Some(description) = &task.description {
        lines.push(format!("      {description}"));
    }
    if !task.tags.is_empty() {
        lines.push(format!("      tags: {}", task.tags.join(", ")));
    }
    lines.join("\n")
}
