use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, bail, eyre};
use std::path::PathBuf;
use todostore::{StatusFilter, TaskId, TaskQuery, TaskStore};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Plain-text to-do list backed by todostore")]
#[command(version)]
struct Cli {
    /// Path to the store directory (default: platform data directory)
    #[arg(short, long)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title
        title: String,
    },

    /// List tasks
    List {
        /// Only completed tasks
        #[arg(long, conflicts_with = "open")]
        done: bool,

        /// Only incomplete tasks
        #[arg(long)]
        open: bool,

        /// Case-insensitive title search
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Toggle a task's completed flag
    Done {
        /// Task id (full id or unique prefix)
        id: String,
    },

    /// Rename a task
    Rename {
        /// Task id (full id or unique prefix)
        id: String,
        /// New title
        title: String,
    },

    /// Delete one or more tasks
    Rm {
        /// Task ids (full ids or unique prefixes)
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let dir = match cli.store_dir {
        Some(dir) => dir,
        None => default_store_dir()?,
    };

    let mut store = TaskStore::open(&dir)?;

    match cli.command {
        Commands::Add { title } => {
            let item = store.create(title)?;
            println!("Added {}  {}", short_id(&item.id), item.title);
        }
        Commands::List { done, open, search } => {
            let status = if done {
                StatusFilter::Completed
            } else if open {
                StatusFilter::Incomplete
            } else {
                StatusFilter::All
            };
            let query = TaskQuery {
                status,
                search,
            };

            let items = store.query(&query);
            if items.is_empty() {
                println!("No tasks.");
                return Ok(());
            }

            for item in &items {
                let marker = if item.completed {
                    "[x]".green()
                } else {
                    "[ ]".normal()
                };
                let title = if item.completed {
                    item.title.strikethrough().dimmed()
                } else {
                    item.title.normal()
                };
                println!(
                    "{} {}  {}  {}",
                    marker,
                    short_id(&item.id).dimmed(),
                    title,
                    format_timestamp(item.created_at).dimmed()
                );
            }
        }
        Commands::Done { id } => {
            let id = resolve_id(&store, &id)?;
            let item = store.toggle_completed(id)?;
            let state = if item.completed { "done" } else { "open" };
            println!("Marked {} as {}", item.title, state);
        }
        Commands::Rename { id, title } => {
            let id = resolve_id(&store, &id)?;
            let item = store.rename(id, title)?;
            println!("Renamed {} to {}", short_id(&item.id), item.title);
        }
        Commands::Rm { ids } => {
            let ids = ids
                .iter()
                .map(|raw| resolve_id(&store, raw))
                .collect::<Result<Vec<TaskId>>>()?;
            let removed = store.delete_many(&ids)?;
            println!("Removed {} task(s)", removed);
        }
    }

    Ok(())
}

fn default_store_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| eyre!("Could not determine platform data directory"))?;
    Ok(base.join("todostore"))
}

/// Resolve a full id or a unique id prefix against the store.
fn resolve_id(store: &TaskStore, raw: &str) -> Result<TaskId> {
    if let Ok(id) = raw.parse::<TaskId>() {
        return Ok(id);
    }

    let matches: Vec<TaskId> = store
        .query(&TaskQuery::all())
        .iter()
        .filter(|item| item.id.to_string().starts_with(raw))
        .map(|item| item.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no task matches id '{}'", raw),
        _ => bail!("id '{}' is ambiguous ({} matches)", raw, matches.len()),
    }
}

fn short_id(id: &TaskId) -> String {
    id.to_string()[..8].to_string()
}

fn format_timestamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
