use anyhow::Context;
use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::dashboard::{compute_stats, recent_tasks};
use crate::models::{Priority, Status, Task, TaskDraft};
use crate::store::TaskStore;

fn parse_due(raw: Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    raw.map(|d| {
        NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("invalid due date '{d}': use YYYY-MM-DD"))
    })
    .transpose()
}

fn parse_status(raw: Option<String>) -> anyhow::Result<Option<Status>> {
    raw.map(|s| s.parse::<Status>().map_err(anyhow::Error::msg))
        .transpose()
}

fn parse_priority(raw: Option<String>) -> anyhow::Result<Option<Priority>> {
    raw.map(|p| p.parse::<Priority>().map_err(anyhow::Error::msg))
        .transpose()
}

fn status_cell(status: Status) -> Cell {
    let color = match status {
        Status::Pending => Color::Yellow,
        Status::InProgress => Color::Cyan,
        Status::Completed => Color::Green,
    };
    Cell::new(status).fg(color)
}

fn priority_cell(priority: Priority) -> Cell {
    let color = match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    };
    Cell::new(priority).fg(color)
}

fn due_string(task: &Task) -> String {
    task.due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".into())
}

/// Date portion of a server timestamp, for compact display.
fn day_of(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

fn task_table(tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Updated").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.title),
            status_cell(t.status),
            priority_cell(t.priority),
            Cell::new(due_string(t)),
            Cell::new(day_of(&t.updated_at)),
        ]);
    }
    table
}

/// Lists tasks in a formatted table, filtered locally.
pub async fn cmd_list(
    store: &mut TaskStore,
    status: Option<String>,
    priority: Option<String>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let status = parse_status(status)?;
    let priority = parse_priority(priority)?;
    let needle = search.map(|s| s.to_lowercase());

    store.fetch_all().await.context("failed to fetch tasks")?;

    let tasks: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| status.is_none_or(|s| t.status == s))
        .filter(|t| priority.is_none_or(|p| t.priority == p))
        .filter(|t| {
            needle.as_deref().is_none_or(|n| {
                t.title.to_lowercase().contains(n) || t.description.to_lowercase().contains(n)
            })
        })
        .collect();

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    println!("{}", task_table(&tasks));
    Ok(())
}

/// Creates a new task on the server.
pub async fn cmd_add(
    store: &mut TaskStore,
    title: String,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due: Option<String>,
) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("title must not be empty");
    }
    let draft = TaskDraft {
        title,
        description: description.unwrap_or_default(),
        status: parse_status(status)?.unwrap_or_default(),
        priority: parse_priority(priority)?.unwrap_or_default(),
        due_date: parse_due(due)?,
    };
    let task = store
        .create(&draft)
        .await
        .context("failed to create task")?;
    println!("Task created (id = {})", task.id);
    Ok(())
}

/// Edits an existing task. Unspecified fields keep their current values;
/// the merged draft is sent as a whole.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_edit(
    store: &mut TaskStore,
    id: String,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due: Option<String>,
    clear_due: bool,
) -> anyhow::Result<()> {
    let status = parse_status(status)?;
    let priority = parse_priority(priority)?;
    let due = parse_due(due)?;

    let current = store
        .fetch_one(&id)
        .await
        .with_context(|| format!("failed to load task {id}"))?;

    let draft = TaskDraft {
        title: title.unwrap_or(current.title),
        description: description.unwrap_or(current.description),
        status: status.unwrap_or(current.status),
        priority: priority.unwrap_or(current.priority),
        due_date: if clear_due {
            None
        } else {
            due.or(current.due_date)
        },
    };
    store
        .update(&id, &draft)
        .await
        .context("failed to update task")?;
    println!("Task {id} updated.");
    Ok(())
}

/// Marks a task as completed.
pub async fn cmd_complete(store: &mut TaskStore, id: String) -> anyhow::Result<()> {
    let current = store
        .fetch_one(&id)
        .await
        .with_context(|| format!("failed to load task {id}"))?;

    let mut draft = TaskDraft::from_task(&current);
    draft.status = Status::Completed;
    store
        .update(&id, &draft)
        .await
        .context("failed to update task")?;
    println!("Task {id} marked as complete.");
    Ok(())
}

/// Removes a task from the server.
pub async fn cmd_remove(store: &mut TaskStore, id: String) -> anyhow::Result<()> {
    store
        .delete(&id)
        .await
        .with_context(|| format!("failed to delete task {id}"))?;
    println!("Task {id} removed.");
    Ok(())
}

/// Prints the aggregate view: counts, completion rate and the most recently
/// updated tasks.
pub async fn cmd_dashboard(store: &mut TaskStore) -> anyhow::Result<()> {
    store.fetch_all().await.context("failed to fetch tasks")?;

    let stats = compute_stats(store.tasks());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new("Pending").add_attribute(Attribute::Bold),
        Cell::new("In Progress").add_attribute(Attribute::Bold),
        Cell::new("Completed").add_attribute(Attribute::Bold),
        Cell::new("High Priority").add_attribute(Attribute::Bold),
        Cell::new("Completion").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new(stats.total),
        Cell::new(stats.pending).fg(Color::Yellow),
        Cell::new(stats.in_progress).fg(Color::Cyan),
        Cell::new(stats.completed).fg(Color::Green),
        Cell::new(stats.high_priority).fg(Color::Red),
        Cell::new(format!("{:.0}%", stats.completion_rate)),
    ]);
    println!("{table}");

    let recent = recent_tasks(store.tasks(), 5);
    if !recent.is_empty() {
        println!();
        println!("Recently updated:");
        println!("{}", task_table(&recent));
    }
    Ok(())
}
