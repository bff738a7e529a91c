use chrono::NaiveDate;
use ratatui::widgets::TableState;

use crate::models::{Priority, Status, TaskDraft};
use crate::store::TaskStore;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

/// The logical views. `Dashboard` doubles as the home/fallback view.
#[derive(Clone, PartialEq)]
pub enum Route {
    Dashboard,
    Tasks,
    AddTask,
    EditTask(String),
}

/// Field labels of the edit view, in cursor order.
pub const EDIT_FIELDS: [&str; 5] = ["Title", "Description", "Status", "Priority", "Due date"];

/// State for the multi-step "Add Task" wizard.
///
/// Kept intact when a create fails, so the user's input survives the error.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due: Option<NaiveDate>,
    pub step: usize, // 0: Title, 1: Description, 2: Status, 3: Priority, 4: Due
    pub error: Option<String>,
}

pub struct App {
    pub store: TaskStore,
    pub route: Route,
    pub table_state: TableState,
    /// Cursor into [`EDIT_FIELDS`] on the edit view.
    pub field_index: usize,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    /// Transient status-line message.
    pub notice: Option<String>,
}

impl App {
    pub fn new(store: TaskStore) -> App {
        App {
            store,
            route: Route::Dashboard,
            table_state: TableState::default(),
            field_index: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            notice: None,
        }
    }

    /// Reloads the mirror from the server. A failure leaves the current
    /// mirror in place and is surfaced on the status line.
    pub async fn refresh(&mut self) {
        if let Err(err) = self.store.fetch_all().await {
            tracing::warn!(%err, "task fetch failed");
            self.notice = Some(format!("Failed to fetch tasks: {err}"));
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.store.tasks().len();
        if len == 0 {
            self.table_state.select(None);
        } else if let Some(i) = self.table_state.selected() {
            if i >= len {
                self.table_state.select(Some(len - 1));
            }
        } else {
            self.table_state.select(Some(0));
        }
    }

    fn selected_id(&self) -> Option<String> {
        match &self.route {
            Route::Tasks => self
                .table_state
                .selected()
                .and_then(|i| self.store.tasks().get(i))
                .map(|t| t.id.clone()),
            Route::EditTask(id) => Some(id.clone()),
            _ => None,
        }
    }

    /// Selects the next row or edit field, depending on the view.
    pub fn next(&mut self) {
        match &self.route {
            Route::Tasks => {
                let len = self.store.tasks().len();
                if len == 0 {
                    return;
                }
                let i = match self.table_state.selected() {
                    Some(i) => {
                        if i >= len - 1 {
                            0
                        } else {
                            i + 1
                        }
                    }
                    None => 0,
                };
                self.table_state.select(Some(i));
            }
            Route::EditTask(_) => {
                self.field_index = (self.field_index + 1) % EDIT_FIELDS.len();
            }
            _ => {}
        }
    }

    /// Selects the previous row or edit field, depending on the view.
    pub fn previous(&mut self) {
        match &self.route {
            Route::Tasks => {
                let len = self.store.tasks().len();
                if len == 0 {
                    return;
                }
                let i = match self.table_state.selected() {
                    Some(i) => {
                        if i == 0 {
                            len - 1
                        } else {
                            i - 1
                        }
                    }
                    None => 0,
                };
                self.table_state.select(Some(i));
            }
            Route::EditTask(_) => {
                self.field_index =
                    (self.field_index + EDIT_FIELDS.len() - 1) % EDIT_FIELDS.len();
            }
            _ => {}
        }
    }

    /// Toggles between the dashboard and the task list.
    pub fn toggle_view(&mut self) {
        self.route = if matches!(self.route, Route::Dashboard) {
            Route::Tasks
        } else {
            Route::Dashboard
        };
    }

    /// One level back: edit and add return to the list, the list to the
    /// dashboard.
    pub fn back(&mut self) {
        match self.route {
            Route::EditTask(_) | Route::AddTask => self.route = Route::Tasks,
            Route::Tasks => self.route = Route::Dashboard,
            Route::Dashboard => {}
        }
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.route = Route::AddTask;
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Context-dependent Enter: open the edit view from the list, or start
    /// editing the selected field inside it.
    pub fn activate(&mut self) {
        match &self.route {
            Route::Tasks => self.open_edit(),
            Route::EditTask(_) => self.start_field_edit(),
            _ => {}
        }
    }

    fn open_edit(&mut self) {
        if let Some(id) = self.selected_id() {
            self.route = Route::EditTask(id);
            self.field_index = 0;
        }
    }

    fn start_field_edit(&mut self) {
        let Route::EditTask(id) = &self.route else {
            return;
        };
        // The not-found view has nothing to edit.
        let Some(task) = self.store.task_by_id(id) else {
            return;
        };
        self.input_buffer = match self.field_index {
            0 => task.title.clone(),
            1 => task.description.clone(),
            2 => task.status.to_string(),
            3 => task.priority.to_string(),
            4 => task.due_date.map(|d| d.to_string()).unwrap_or_default(),
            _ => String::new(),
        };
        self.input_mode = InputMode::Editing;
    }

    /// Cancels the current input; an aborted add returns to the list.
    pub fn cancel_input(&mut self) {
        self.input_buffer.clear();
        if self.input_mode == InputMode::Adding {
            self.add_state = AddState::default();
            self.route = Route::Tasks;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Marks the selected task completed.
    pub async fn complete_selected(&mut self) {
        if self.route != Route::Tasks {
            return;
        }
        self.set_selected_status(Status::Completed).await;
    }

    /// Advances the selected task one step in the status cycle.
    pub async fn cycle_status_selected(&mut self) {
        if self.route != Route::Tasks {
            return;
        }
        let Some(id) = self.selected_id() else { return };
        let Some(current) = self.store.task_by_id(&id) else {
            return;
        };
        let next = current.status.next();
        self.set_selected_status(next).await;
    }

    async fn set_selected_status(&mut self, status: Status) {
        let Some(id) = self.selected_id() else { return };
        let Some(task) = self.store.task_by_id(&id) else {
            return;
        };
        let mut draft = TaskDraft::from_task(task);
        draft.status = status;
        match self.store.update(&id, &draft).await {
            Ok(updated) => self.notice = Some(format!("Task is now {}.", updated.status)),
            Err(err) => {
                tracing::warn!(%err, "status update failed");
                self.notice = Some(format!("Failed to update task: {err}"));
            }
        }
    }

    /// Deletes the selected task. The row disappears only after the server
    /// confirms; a failure leaves it selected and reports on the status line.
    pub async fn delete_selected(&mut self) {
        if self.route != Route::Tasks {
            return;
        }
        let Some(id) = self.selected_id() else { return };
        match self.store.delete(&id).await {
            Ok(()) => {
                self.notice = Some("Task deleted.".into());
                self.clamp_selection();
            }
            Err(err) => {
                tracing::warn!(%err, "delete failed");
                self.notice = Some(format!("Failed to delete task: {err}"));
            }
        }
    }

    /// Handles a submitted input line based on the current mode.
    pub async fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input().await,
            InputMode::Editing => self.handle_editing_input().await,
            InputMode::Normal => {}
        }
    }

    async fn handle_adding_input(&mut self) {
        self.add_state.error = None;
        match self.add_state.step {
            0 => {
                // Title is the one required field.
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.title = self.input_buffer.trim().to_string();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => {
                self.add_state.description = self.input_buffer.trim().to_string();
                self.add_state.step += 1;
                self.input_buffer.clear();
            }
            2 => {
                let value = self.input_buffer.trim();
                if value.is_empty() {
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                } else {
                    match value.parse::<Status>() {
                        Ok(s) => {
                            self.add_state.status = s;
                            self.add_state.step += 1;
                            self.input_buffer.clear();
                        }
                        Err(e) => self.add_state.error = Some(e),
                    }
                }
            }
            3 => {
                let value = self.input_buffer.trim();
                if value.is_empty() {
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                } else {
                    match value.parse::<Priority>() {
                        Ok(p) => {
                            self.add_state.priority = p;
                            self.add_state.step += 1;
                            self.input_buffer.clear();
                        }
                        Err(e) => self.add_state.error = Some(e),
                    }
                }
            }
            4 => {
                let value = self.input_buffer.trim().to_string();
                if !value.is_empty() {
                    match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
                        Ok(d) => self.add_state.due = Some(d),
                        Err(_) => {
                            self.add_state.error =
                                Some(format!("Invalid due date '{value}': use YYYY-MM-DD."));
                            return;
                        }
                    }
                }
                self.submit_add().await;
            }
            _ => {}
        }
    }

    async fn submit_add(&mut self) {
        let draft = TaskDraft {
            title: self.add_state.title.clone(),
            description: self.add_state.description.clone(),
            status: self.add_state.status,
            priority: self.add_state.priority,
            due_date: self.add_state.due,
        };
        match self.store.create(&draft).await {
            Ok(task) => {
                tracing::debug!(id = %task.id, "task created from form");
                self.notice = Some("Task created.".into());
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.add_state = AddState::default();
                self.route = Route::Tasks;
                // The new task sits at the front of the mirror.
                self.table_state.select(Some(0));
            }
            Err(err) => {
                tracing::warn!(%err, "create failed");
                // Wizard state stays intact for a retry.
                self.add_state.error = Some(format!("Failed to create task: {err}"));
            }
        }
    }

    async fn handle_editing_input(&mut self) {
        let Route::EditTask(id) = &self.route else {
            return;
        };
        let id = id.clone();
        let Some(current) = self.store.task_by_id(&id).cloned() else {
            self.notice = Some("Task is no longer loaded.".into());
            self.input_mode = InputMode::Normal;
            self.input_buffer.clear();
            return;
        };

        let mut draft = TaskDraft::from_task(&current);
        let value = self.input_buffer.trim().to_string();
        match self.field_index {
            0 => {
                if value.is_empty() {
                    self.notice = Some("Title must not be empty.".into());
                    return;
                }
                draft.title = value;
            }
            1 => draft.description = value,
            2 => match value.parse::<Status>() {
                Ok(s) => draft.status = s,
                Err(e) => {
                    self.notice = Some(e);
                    return;
                }
            },
            3 => match value.parse::<Priority>() {
                Ok(p) => draft.priority = p,
                Err(e) => {
                    self.notice = Some(e);
                    return;
                }
            },
            4 => {
                if value.is_empty() {
                    draft.due_date = None;
                } else {
                    match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
                        Ok(d) => draft.due_date = Some(d),
                        Err(_) => {
                            self.notice =
                                Some(format!("Invalid due date '{value}': use YYYY-MM-DD."));
                            return;
                        }
                    }
                }
            }
            _ => {}
        }

        match self.store.update(&id, &draft).await {
            Ok(_) => {
                self.notice = Some("Task updated.".into());
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            Err(err) => {
                tracing::warn!(%err, "update failed");
                // Keep the buffer so the entered value is not lost.
                self.notice = Some(format!("Failed to update task: {err}"));
            }
        }
    }
}
