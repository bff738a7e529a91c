use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::dashboard::{compute_stats, recent_tasks};
use crate::models::{Priority, Status, Task};

use super::app::{App, InputMode, Route, EDIT_FIELDS};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // View
            Constraint::Length(1), // Status line
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    match app.route.clone() {
        Route::Dashboard => draw_dashboard(f, app, chunks[0]),
        Route::Tasks | Route::AddTask => draw_tasks(f, app, chunks[0]),
        Route::EditTask(id) => draw_edit(f, app, chunks[0], &id),
    }

    let message = if app.input_mode == InputMode::Adding {
        app.add_state.error.clone().or_else(|| app.notice.clone())
    } else {
        app.notice.clone()
    };
    let status_line = Paragraph::new(message.unwrap_or_default())
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(status_line, chunks[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.route {
            Route::Dashboard => "q: Quit | v: View Tasks | a: Add | r: Refresh",
            Route::Tasks => {
                "q: Quit | j/k: Move | Enter: Edit | a: Add | Space: Complete | s: Status | d: Del | r: Refresh | v: Dashboard"
            }
            Route::EditTask(_) => "q: Quit | j/k: Select Field | Enter: Edit Field | Esc: Back",
            Route::AddTask => "Enter: Next Step | Esc: Cancel",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = input_title(app);
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

fn input_title(app: &App) -> String {
    match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Title".to_string(),
            1 => "Add Task: Enter Description (Optional)".to_string(),
            2 => "Add Task: Enter Status (pending / in-progress / completed)".to_string(),
            3 => "Add Task: Enter Priority (low / medium / high)".to_string(),
            4 => "Add Task: Enter Due Date (YYYY-MM-DD, Optional)".to_string(),
            _ => "Add Task".to_string(),
        },
        InputMode::Editing => format!("Edit {}", EDIT_FIELDS[app.field_index]),
        InputMode::Normal => String::new(),
    }
}

fn busy_suffix(app: &App) -> &'static str {
    if app.store.is_busy() {
        " (busy)"
    } else {
        ""
    }
}

fn draw_dashboard(f: &mut Frame, app: &mut App, area: Rect) {
    let stats = compute_stats(app.store.tasks());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Stat tiles
            Constraint::Length(3), // Completion gauge
            Constraint::Min(0),    // Recent tasks
        ])
        .split(area);

    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(rows[0]);

    let tile = |title: &'static str, value: usize, color: Color| {
        Paragraph::new(value.to_string())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(title))
    };
    f.render_widget(tile("Total", stats.total, Color::White), tiles[0]);
    f.render_widget(tile("Pending", stats.pending, Color::Yellow), tiles[1]);
    f.render_widget(tile("In Progress", stats.in_progress, Color::Cyan), tiles[2]);
    f.render_widget(tile("Completed", stats.completed, Color::Green), tiles[3]);
    f.render_widget(tile("High Priority", stats.high_priority, Color::Red), tiles[4]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Completion"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((stats.completion_rate / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", stats.completion_rate));
    f.render_widget(gauge, rows[1]);

    let recent = recent_tasks(app.store.tasks(), 5);
    let recent_rows: Vec<Row> = recent
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.title.clone()),
                Cell::from(t.status.to_string()),
                Cell::from(t.priority.to_string()),
                Cell::from(day_of(&t.updated_at).to_string()),
            ])
            .style(row_style(t))
        })
        .collect();

    let title = format!("Taskdeck - Dashboard{}", busy_suffix(app));
    let recent_table = Table::new(
        recent_rows,
        [
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Recently Updated", "Status", "Priority", "Updated"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1),
    )
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(recent_table, rows[2]);
}

fn draw_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .store
        .tasks()
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.id.clone()),
                Cell::from(t.title.clone()),
                Cell::from(t.status.to_string()),
                Cell::from(t.priority.to_string()),
                Cell::from(
                    t.due_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".into()),
                ),
                Cell::from(day_of(&t.updated_at).to_string()),
            ])
            .style(row_style(t))
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let title = format!("Taskdeck - Tasks{}", busy_suffix(app));
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "Title", "Status", "Priority", "Due", "Updated"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_edit(f: &mut Frame, app: &App, area: Rect, id: &str) {
    let Some(task) = app.store.task_by_id(id) else {
        let not_found = Paragraph::new(format!(
            "Task {id} is not in the loaded list.\nPress Esc to go back, r to refresh."
        ))
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title("Task Not Found"));
        f.render_widget(not_found, area);
        return;
    };

    let values = [
        task.title.clone(),
        task.description.clone(),
        task.status.to_string(),
        task.priority.to_string(),
        task.due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into()),
    ];
    let rows: Vec<Row> = EDIT_FIELDS
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == app.field_index {
                Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![Cell::from(*label), Cell::from(value)]).style(style)
        })
        .collect();

    let title = format!("Edit Task: {}{}", task.title, busy_suffix(app));
    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(20)])
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, area);
}

fn row_style(task: &Task) -> Style {
    if task.status == Status::Completed {
        return Style::default().fg(Color::DarkGray);
    }
    match task.priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    }
}

/// Date portion of a server timestamp, for compact display.
fn day_of(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height.saturating_sub(height)) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
