//! In-memory mirror of the server's task collection.
//!
//! The store owns the only local copy of the tasks and routes every mutation
//! through the API client. The mirror changes only after the server confirms
//! an operation: nothing is inserted, replaced or removed speculatively, and
//! a failed round trip leaves it exactly as it was.
//!
//! Operations take `&mut self`, so a caller cannot overlap two of them on the
//! same store; their order is the order in which they are awaited. Once
//! issued, an operation runs to completion. There is no automatic retry.

use crate::api::{ApiClient, ApiError};
use crate::models::{Task, TaskDraft};

pub struct TaskStore {
    api: ApiClient,
    tasks: Vec<Task>,
    busy: bool,
}

impl TaskStore {
    pub fn new(api: ApiClient) -> TaskStore {
        TaskStore {
            api,
            tasks: Vec::new(),
            busy: false,
        }
    }

    /// The mirrored collection, in the order the server last sent it
    /// (with created tasks inserted at the front since).
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether a round trip is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replaces the whole mirror with the server's collection.
    ///
    /// On failure the previous mirror is kept and the error is returned for
    /// the caller to surface.
    pub async fn fetch_all(&mut self) -> Result<(), ApiError> {
        self.busy = true;
        let result = self.api.list_tasks().await;
        self.busy = false;

        let tasks = result?;
        tracing::debug!(count = tasks.len(), "task mirror replaced");
        self.tasks = tasks;
        Ok(())
    }

    /// Fetches one task by id and refreshes its mirror entry if present.
    ///
    /// Used to prefill edits without loading the whole collection.
    pub async fn fetch_one(&mut self, id: &str) -> Result<Task, ApiError> {
        self.busy = true;
        let result = self.api.get_task(id).await;
        self.busy = false;

        let task = result?;
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
            *slot = task.clone();
        }
        Ok(task)
    }

    /// Sends `draft` to the server; on success the server-assigned task is
    /// inserted at the front of the mirror (most recent first) and returned.
    pub async fn create(&mut self, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.busy = true;
        let result = self.api.create_task(draft).await;
        self.busy = false;

        let task = result?;
        tracing::debug!(id = %task.id, "task created");
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Sends `draft` for the task identified by `id`; on success the matching
    /// mirror element is replaced with the server's record.
    ///
    /// A confirmed update whose id is not in the mirror is simply not
    /// reflected locally; that is not an error.
    pub async fn update(&mut self, id: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.busy = true;
        let result = self.api.update_task(id, draft).await;
        self.busy = false;

        let task = result?;
        tracing::debug!(id = %task.id, "task updated");
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
            *slot = task.clone();
        }
        Ok(task)
    }

    /// Asks the server to remove the task; on success the mirror element with
    /// that id is dropped (a no-op if it was never mirrored). The element is
    /// never removed before the server confirms.
    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.busy = true;
        let result = self.api.delete_task(id).await;
        self.busy = false;

        result?;
        tracing::debug!(id, "task deleted");
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }
}
