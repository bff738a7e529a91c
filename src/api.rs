//! HTTP client for the remote task service.
//!
//! Translates between the server's wire records (snake_case, `_id` identity
//! field) and the internal [`Task`] model. Each operation performs exactly
//! one request; there is no retry and no caching. The only timeout is the
//! one configured on the underlying client.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Priority, Status, Task, TaskDraft};

/// Base URL used when neither the CLI flag nor `TASKDECK_API` is set.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Resolves the service base URL.
///
/// Order: explicit `--api-url` flag, then the `TASKDECK_API` environment
/// variable, then [`DEFAULT_API_URL`].
pub fn resolve_api_url(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("TASKDECK_API").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Errors from a single round trip to the task service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed: unreachable host, timeout, aborted
    /// connection.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("server returned {status}: {message}")]
    Status {
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The response body did not match the expected wire shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A task record as the server sends it.
#[derive(Deserialize)]
struct TaskWire {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    status: Status,
    priority: Priority,
    #[serde(default)]
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TaskWire {
    fn into_task(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due_date.as_deref().and_then(parse_due_date),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The request body for create and update.
#[derive(Serialize)]
struct DraftWire<'a> {
    title: &'a str,
    description: &'a str,
    status: Status,
    priority: Priority,
    due_date: Option<String>,
}

impl<'a> From<&'a TaskDraft> for DraftWire<'a> {
    fn from(draft: &'a TaskDraft) -> Self {
        DraftWire {
            title: &draft.title,
            description: &draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft
                .due_date
                .map(|d| format!("{}T00:00:00Z", d.format("%Y-%m-%d"))),
        }
    }
}

/// Extracts the calendar date from a wire due date, which may be a bare
/// `YYYY-MM-DD` or a full timestamp. Anything unparseable counts as absent.
fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// HTTP client bound to one task service.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the service at `base_url` (e.g.
    /// `http://127.0.0.1:8000/api`).
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            http: reqwest::Client::builder()
                .user_agent(concat!("taskdeck/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client should build"),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetches the full task collection, in server order.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let resp = self.http.get(self.url("/tasks")).send().await?;
        let wires: Vec<TaskWire> = read_json(check_response(resp).await?).await?;
        Ok(wires.into_iter().map(TaskWire::into_task).collect())
    }

    /// Fetches a single task by id.
    pub async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        let wire: TaskWire = read_json(check_response(resp).await?).await?;
        Ok(wire.into_task())
    }

    /// Creates a task from `draft`; the returned record carries the
    /// server-assigned id and timestamps.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        let resp = self
            .http
            .post(self.url("/tasks"))
            .json(&DraftWire::from(draft))
            .send()
            .await?;
        let wire: TaskWire = read_json(check_response(resp).await?).await?;
        Ok(wire.into_task())
    }

    /// Replaces the task identified by `id` with `draft`; returns the
    /// server's updated record.
    pub async fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/tasks/{id}")))
            .json(&DraftWire::from(draft))
            .send()
            .await?;
        let wire: TaskWire = read_json(check_response(resp).await?).await?;
        Ok(wire.into_task())
    }

    /// Deletes the task identified by `id`. Success carries no body.
    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }
}

/// Maps a non-success status to [`ApiError::Status`], capturing the body.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if !resp.status().is_success() {
        return Err(ApiError::Status {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Reads the body as text before decoding, so a transport failure and a
/// malformed body surface as different error kinds.
async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"[
        {
            "_id": "675f1c2ab1e4f0a8d3c90001",
            "title": "Write release notes",
            "description": "Cover the new dashboard",
            "status": "in-progress",
            "priority": "high",
            "due_date": "2024-12-30T00:00:00",
            "created_at": "2024-12-15T10:00:00",
            "updated_at": "2024-12-16T09:30:00"
        },
        {
            "_id": "675f1c2ab1e4f0a8d3c90002",
            "title": "Update dependencies",
            "description": "",
            "status": "pending",
            "priority": "low",
            "due_date": null,
            "created_at": "2024-12-12T08:00:00",
            "updated_at": "2024-12-12T08:00:00"
        }
    ]"#;

    #[test]
    fn parse_wire_records() {
        let wires: Vec<TaskWire> = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(wires.len(), 2);
        assert_eq!(wires[0].id, "675f1c2ab1e4f0a8d3c90001");
        assert_eq!(wires[0].status, Status::InProgress);
        assert_eq!(wires[1].priority, Priority::Low);
        assert!(wires[1].due_date.is_none());
    }

    #[test]
    fn wire_maps_to_task() {
        let wires: Vec<TaskWire> = serde_json::from_str(FIXTURE).unwrap();
        let tasks: Vec<Task> = wires.into_iter().map(TaskWire::into_task).collect();

        assert_eq!(tasks[0].due_date, NaiveDate::from_ymd_opt(2024, 12, 30));
        assert_eq!(tasks[0].created_at, "2024-12-15T10:00:00");
        assert_eq!(tasks[1].due_date, None);
        assert_eq!(tasks[1].description, "");
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let wire: TaskWire = serde_json::from_str(
            r#"{"_id":"x","title":"t","status":"pending","priority":"medium",
                "created_at":"2024-01-01T00:00:00","updated_at":"2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(wire.description, "");
        assert!(wire.due_date.is_none());
    }

    #[test]
    fn unparseable_due_date_counts_as_absent() {
        assert_eq!(parse_due_date("soon"), None);
        assert_eq!(parse_due_date(""), None);
        assert_eq!(
            parse_due_date("2024-12-30"),
            NaiveDate::from_ymd_opt(2024, 12, 30)
        );
        assert_eq!(
            parse_due_date("2024-12-30T15:04:05Z"),
            NaiveDate::from_ymd_opt(2024, 12, 30)
        );
    }

    #[test]
    fn draft_serializes_due_date_as_timestamp_or_null() {
        let mut draft = TaskDraft {
            title: "t".into(),
            ..TaskDraft::default()
        };
        let body = serde_json::to_value(DraftWire::from(&draft)).unwrap();
        assert_eq!(body["due_date"], serde_json::Value::Null);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["priority"], "medium");

        draft.due_date = NaiveDate::from_ymd_opt(2025, 1, 5);
        let body = serde_json::to_value(DraftWire::from(&draft)).unwrap();
        assert_eq!(body["due_date"], "2025-01-05T00:00:00Z");
    }

    #[test]
    fn url_joins_without_doubled_slash() {
        let client = ApiClient::new("http://localhost:8000/api/");
        assert_eq!(client.url("/tasks"), "http://localhost:8000/api/tasks");
        assert_eq!(client.base_url(), "http://localhost:8000/api/");
    }

    #[test]
    fn api_url_flag_wins() {
        assert_eq!(
            resolve_api_url(Some("http://example.com/api".into())),
            "http://example.com/api"
        );
    }
}
