//! # Taskdeck
//!
//! A terminal client for a remote task-management service. Taskdeck combines a fast CLI for scripted operations with a rich TUI (Terminal User Interface) for interactive management. All task state lives on the server; the client keeps an in-memory mirror that only changes after the server confirms an operation.
//!
//! ## Features
//!
//! *   **Dual Interface**:
//!     *   **CLI**: Scriptable and quick for single commands.
//!     *   **TUI**: Interactive dashboard, task list and forms.
//! *   **Dashboard**: Counts by status, high-priority count, completion rate and the most recently updated tasks.
//! *   **Server-backed**: Create, edit, complete and delete round-trip through the HTTP API; nothing is applied locally until the server confirms it.
//!
//! ## Installation
//!
//! ```bash
//! cargo install --path .
//! ```
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! Simply run the command without arguments to launch the interactive UI:
//!
//! ```bash
//! taskdeck
//! # or explicitly
//! taskdeck ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! **Global**
//! *   `q`: Quit
//! *   `v`: Toggle Dashboard / Task list
//! *   `a`: Add new task
//! *   `r`: Refresh from server
//!
//! **Task List**
//! *   `j`/`k` or arrows: Move selection
//! *   `Enter` or `e`: Edit selected task
//! *   `Space`: Mark selected task completed
//! *   `s`: Cycle status of selected task
//! *   `d`: Delete selected task
//! *   `Esc`: Back to dashboard
//!
//! **Edit View**
//! *   `j`/`k`: Select field
//! *   `Enter`: Edit selected field, `Enter` again to save
//! *   `Esc`: Back to task list
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # List tasks, optionally filtered
//! taskdeck list
//! taskdeck list --status pending --priority high --search "report"
//!
//! # Add a task
//! taskdeck add "Write report" --priority high --due 2025-12-01
//!
//! # Edit fields of a task
//! taskdeck edit <ID> --status in-progress --due 2025-12-24
//!
//! # Complete / remove a task
//! taskdeck complete <ID>
//! taskdeck remove <ID>
//!
//! # Aggregate overview
//! taskdeck dashboard
//! ```
//!
//! ## Server
//!
//! The client talks to `http://127.0.0.1:8000/api` by default. Override with
//! `--api-url` or the `TASKDECK_API` environment variable. Log verbosity is
//! controlled by `--verbose`/`--quiet` or the `TASKDECK_LOG` filter.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

use taskdeck::api::{resolve_api_url, ApiClient};
use taskdeck::commands::*;
use taskdeck::store::TaskStore;
use taskdeck::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Terminal client for a remote task manager", long_about = None)]
struct Cli {
    /// Base URL of the task service (default http://127.0.0.1:8000/api)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// More log output
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    List {
        /// Only tasks with this status (pending, in-progress, completed)
        #[arg(short, long)]
        status: Option<String>,
        /// Only tasks with this priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Only tasks whose title or description contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,
        /// Initial status (defaults to pending)
        #[arg(short, long)]
        status: Option<String>,
        /// Priority (defaults to medium)
        #[arg(short, long)]
        priority: Option<String>,
        /// Due date in YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New status
        #[arg(short, long)]
        status: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New due date in YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Mark a task as completed
    Complete { id: String },
    /// Remove a task
    Remove { id: String },
    /// Show the aggregate dashboard
    Dashboard,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let api_url = resolve_api_url(cli.api_url.clone());
    let api = ApiClient::new(&api_url);
    let mut store = TaskStore::new(api);

    match cli.command {
        Some(Commands::List {
            status,
            priority,
            search,
        }) => cmd_list(&mut store, status, priority, search).await,
        Some(Commands::Add {
            title,
            description,
            status,
            priority,
            due,
        }) => cmd_add(&mut store, title, description, status, priority, due).await,
        Some(Commands::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
            clear_due,
        }) => {
            cmd_edit(
                &mut store,
                id,
                title,
                description,
                status,
                priority,
                due,
                clear_due,
            )
            .await
        }
        Some(Commands::Complete { id }) => cmd_complete(&mut store, id).await,
        Some(Commands::Remove { id }) => cmd_remove(&mut store, id).await,
        Some(Commands::Dashboard) => cmd_dashboard(&mut store).await,
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => anyhow::bail!("unsupported shell: {shell}"),
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskdeck", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(store)
            .await
            .map_err(|e| anyhow::anyhow!("TUI failed: {e}")),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TASKDECK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
