use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workflow state of a task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }

    /// The next state in the pending -> in-progress -> completed cycle.
    pub fn next(self) -> Status {
        match self {
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "in-progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(format!(
                "unknown status '{other}': use pending, in-progress or completed"
            )),
        }
    }
}

/// How important a task is.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!(
                "unknown priority '{other}': use low, medium or high"
            )),
        }
    }
}

/// A task as confirmed by the server.
///
/// Identity and timestamps are server-assigned; the client never invents
/// them. `updated_at` only moves when an update round trip succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Opaque server-assigned identifier, immutable once created.
    pub id: String,
    /// Display title, non-empty.
    pub title: String,
    /// Free text, may be empty.
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    /// Calendar due date, if one was set.
    pub due_date: Option<NaiveDate>,
    /// Server-assigned creation timestamp (ISO 8601, kept verbatim).
    pub created_at: String,
    /// Server-assigned last-modification timestamp (ISO 8601, kept verbatim).
    pub updated_at: String,
}

/// The editable fields of a task, before or independent of a server identity.
///
/// Used by the add and edit forms and sent on create/update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// A draft carrying the current editable fields of `task`.
    pub fn from_task(task: &Task) -> TaskDraft {
        TaskDraft {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_tokens() {
        assert_eq!(serde_json::to_string(&Status::Pending).unwrap(), "\"pending\"");
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"completed\"").unwrap(),
            Status::Completed
        );
    }

    #[test]
    fn priority_wire_tokens() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::from_str::<Priority>("\"low\"").unwrap(),
            Priority::Low
        );
    }

    #[test]
    fn status_parses_and_displays() {
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!(" Completed ".parse::<Status>().unwrap(), Status::Completed);
        assert!("done".parse::<Status>().is_err());
        assert_eq!(Status::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn priority_parses_and_displays() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::Medium.to_string(), "medium");
    }

    #[test]
    fn status_cycle_wraps() {
        assert_eq!(Status::Pending.next(), Status::InProgress);
        assert_eq!(Status::InProgress.next(), Status::Completed);
        assert_eq!(Status::Completed.next(), Status::Pending);
    }

    #[test]
    fn draft_from_task_copies_editable_fields() {
        let task = Task {
            id: "abc".into(),
            title: "Write report".into(),
            description: "quarterly numbers".into(),
            status: Status::InProgress,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            created_at: "2024-12-01T00:00:00".into(),
            updated_at: "2024-12-02T00:00:00".into(),
        };
        let draft = TaskDraft::from_task(&task);
        assert_eq!(draft.title, "Write report");
        assert_eq!(draft.status, Status::InProgress);
        assert_eq!(draft.due_date, task.due_date);
    }
}
