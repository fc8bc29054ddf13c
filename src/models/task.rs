use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// Any status may follow any other; there is no enforced workflow.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    #[serde(rename = "To Do")]
    #[sqlx(rename = "To Do")]
    ToDo,
    /// Task is currently being worked on.
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    /// Task is completed.
    #[serde(rename = "Done")]
    #[sqlx(rename = "Done")]
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Exact match only: `"done"` or `"Don"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "To Do" => Ok(TaskStatus::ToDo),
            "In Progress" => Ok(TaskStatus::InProgress),
            "Done" => Ok(TaskStatus::Done),
            other => Err(format!(
                "Invalid status '{}'. Expected one of: To Do, In Progress, Done",
                other
            )),
        }
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// The only user allowed to read, modify or delete this task.
    pub owner_id: i32,
    /// The user who created the task. Equal to `owner_id` today.
    pub creator_id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Client input for creating a task.
///
/// There is no owner field: ownership comes from the authenticated
/// caller, and unknown JSON fields such as `owner_id` are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskDraft {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Maximum length of 10000 characters.
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub description: String,

    /// Defaults to `To Do` when absent.
    pub status: Option<TaskStatus>,

    pub deadline: Option<DateTime<Utc>>,
}

/// Client input for updating a task. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Applies the present fields onto `task`.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = Some(deadline);
        }
    }
}

/// Insert payload built by the task service; never deserialized from a request.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner_id: i32,
    pub creator_id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
}

/// Raw query parameters for listing tasks.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    /// One of `To Do`, `In Progress`, `Done`.
    pub status: Option<String>,
    /// RFC 3339 timestamp, or `YYYY-MM-DD` meaning midnight UTC of that day.
    pub deadline: Option<String>,
}

/// Parsed and checked listing filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskQuery {
    pub fn parse(&self) -> Result<TaskFilter, String> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<TaskStatus>()?),
        };

        let deadline = match self.deadline.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_deadline(raw)?),
        };

        Ok(TaskFilter { status, deadline })
    }
}

fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| "Invalid deadline format. Use YYYY-MM-DD or RFC 3339.".to_string())
}
