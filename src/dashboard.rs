use crate::models::{Priority, Status, Task};

/// Aggregate counts over the current task collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub high_priority: usize,
    /// Share of completed tasks in percent; 0 for an empty collection.
    pub completion_rate: f64,
}

/// Computes the dashboard counts for `tasks`.
///
/// Pure and side-effect-free, cheap enough to re-derive on every render.
pub fn compute_stats(tasks: &[Task]) -> DashboardStats {
    let total = tasks.len();
    let pending = tasks.iter().filter(|t| t.status == Status::Pending).count();
    let in_progress = tasks
        .iter()
        .filter(|t| t.status == Status::InProgress)
        .count();
    let completed = tasks
        .iter()
        .filter(|t| t.status == Status::Completed)
        .count();
    let high_priority = tasks
        .iter()
        .filter(|t| t.priority == Priority::High)
        .count();
    let completion_rate = if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    DashboardStats {
        total,
        pending,
        in_progress,
        completed,
        high_priority,
        completion_rate,
    }
}

/// The `limit` most recently updated tasks, newest first.
///
/// The sort is stable, so tasks sharing an `updated_at` keep their
/// collection order.
pub fn recent_tasks(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut by_recency: Vec<&Task> = tasks.iter().collect();
    by_recency.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    by_recency.truncate(limit);
    by_recency
}
