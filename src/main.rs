use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use task_tracker::commands::list::ListFilter;
use task_tracker::commands::{add, delete, lifecycle, list, show, update};
use task_tracker::config::Config;
use task_tracker::output::Format;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "task-tracker", about = "Track personal tasks in a local JSON file")]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Path to the task data file (default: ./tasks.json)
    #[arg(long, global = true, env = "TASK_TRACKER_DATA")]
    data: Option<PathBuf>,
    /// Hold an advisory lock on the data file while reading or writing
    #[arg(long, global = true)]
    lock: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        description: Option<String>,
    },
    /// Update a task's title and/or description (empty values are kept)
    Update {
        /// Task ID
        id: u64,
        /// New title ("" keeps the current one)
        title: String,
        /// New description
        description: Option<String>,
    },
    /// Delete a task permanently
    Delete {
        /// Task ID
        id: u64,
    },
    /// Mark a task as done
    MarkDone {
        /// Task ID
        id: u64,
    },
    /// Mark a task as in progress
    MarkInProgress {
        /// Task ID
        id: u64,
    },
    /// Mark a task as todo
    MarkTodo {
        /// Task ID
        id: u64,
    },
    /// Set a task's status (todo, in-progress, done)
    Status {
        /// Task ID
        id: u64,
        /// New status
        status: String,
    },
    /// Display a single task
    Show {
        /// Task ID
        id: u64,
    },
    /// List tasks
    List {
        /// Which tasks to show; pending is todo followed by in-progress
        #[arg(value_enum, default_value = "all")]
        filter: ListFilter,
    },
}

fn run(cli: Cli, format: Format) -> task_tracker::error::Result<()> {
    let config = Config::resolve(cli.data, cli.lock);
    let service = config.open_service();

    match cli.command {
        Commands::Add { title, description } => {
            add::run(&service, &title, description.as_deref().unwrap_or(""), format)
        }
        Commands::Update {
            id,
            title,
            description,
        } => update::run(
            &service,
            id,
            &title,
            description.as_deref().unwrap_or(""),
            format,
        ),
        Commands::Delete { id } => delete::run(&service, id, format),
        Commands::MarkDone { id } => lifecycle::finish(&service, id, format),
        Commands::MarkInProgress { id } => lifecycle::start(&service, id, format),
        Commands::MarkTodo { id } => lifecycle::todo(&service, id, format),
        Commands::Status { id, status } => lifecycle::set(&service, id, &status, format),
        Commands::Show { id } => show::run(&service, id, format),
        Commands::List { filter } => list::run(&service, filter, format),
    }
}

fn init_tracing() {
    // Opt-in via RUST_LOG; ignore filters that fail to parse.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    let matches = Cli::command()
        .version(task_tracker::build_info::version())
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
