pub mod app;
pub mod ui;

use std::{error::Error, io};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::store::TaskStore;
use app::{App, InputMode};
use ui::ui;

pub async fn run_tui(store: TaskStore) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and load the initial mirror
    let mut app = App::new(store);
    app.refresh().await;

    // Run loop
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Char(' ') => app.complete_selected().await,
                    KeyCode::Char('s') => app.cycle_status_selected().await,
                    KeyCode::Char('d') | KeyCode::Delete => app.delete_selected().await,
                    KeyCode::Char('a') => app.start_add(),
                    KeyCode::Char('r') => app.refresh().await,
                    KeyCode::Char('v') => app.toggle_view(),
                    KeyCode::Enter | KeyCode::Char('e') => app.activate(),
                    KeyCode::Esc => app.back(),
                    _ => {}
                },
                InputMode::Editing | InputMode::Adding => match key.code {
                    KeyCode::Enter => app.handle_input().await,
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
            }
        }
    }
}
