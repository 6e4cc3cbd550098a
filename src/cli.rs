//! Command-line definitions and the non-interactive commands.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::filter::TaskFilter;
use crate::store::TaskStore;
use crate::task::{Priority, Status, Task};
use crate::ui::truncate;

const TABLE_COL_ID: usize = 5;
const TABLE_COL_TITLE: usize = 30;
const TABLE_COL_DUE: usize = 12;
const TABLE_COL_PRIORITY: usize = 9;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Interactive command-line task tracker")]
pub struct Cli {
    /// Task file to use instead of the configured one
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Config file (defaults to <config dir>/todo-manager/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output in the menu
    #[arg(long)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print tasks, optionally filtered
    List(ListArgs),
    /// Find tasks whose title or description contains a keyword
    Search(SearchArgs),
    /// Print counts by status and priority
    Stats(JsonArgs),
    /// Write the plain-text summary report
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = TaskFilter::All)]
    pub filter: TaskFilter,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub keyword: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Destination file (defaults to the configured export path)
    pub path: Option<PathBuf>,
}

pub fn run(
    store: &TaskStore,
    command: Commands,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::List(args) => {
            let tasks: Vec<&Task> = store.list(args.filter).collect();
            print_tasks(out, &tasks, args.json)
        }
        Commands::Search(args) => {
            let tasks: Vec<&Task> = store.search(&args.keyword).collect();
            print_tasks(out, &tasks, args.json)
        }
        Commands::Stats(args) => {
            let stats = store.stats();
            if args.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
                return Ok(());
            }
            writeln!(out, "Total: {}", stats.total)?;
            for status in Status::ALL {
                writeln!(out, "{}: {}", status, stats.count(status))?;
            }
            for priority in Priority::ALL {
                writeln!(out, "Active {}: {}", priority, stats.active(priority))?;
            }
            Ok(())
        }
        Commands::Export(args) => {
            let path = args
                .path
                .unwrap_or_else(|| PathBuf::from(&config.export_path));
            store.export_summary(&path)?;
            writeln!(out, "Summary exported to {}", path.display())?;
            Ok(())
        }
    }
}

fn print_tasks(out: &mut impl Write, tasks: &[&Task], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(tasks)?)?;
        return Ok(());
    }
    if tasks.is_empty() {
        writeln!(out, "No tasks found.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<TABLE_COL_ID$} {:<TABLE_COL_TITLE$} {:<TABLE_COL_DUE$} {:<TABLE_COL_PRIORITY$} STATUS",
        "ID", "TITLE", "DUE", "PRIORITY"
    )?;
    writeln!(
        out,
        "{}",
        "-".repeat(TABLE_COL_ID + TABLE_COL_TITLE + TABLE_COL_DUE + TABLE_COL_PRIORITY + 13)
    )?;
    for task in tasks {
        writeln!(
            out,
            "{:<TABLE_COL_ID$} {:<TABLE_COL_TITLE$} {:<TABLE_COL_DUE$} {:<TABLE_COL_PRIORITY$} {}",
            task.id,
            truncate(&task.title, TABLE_COL_TITLE),
            task.due_date,
            task.priority,
            task.status
        )?;
    }
    writeln!(out, "\nTotal: {} tasks", tasks.len())?;
    Ok(())
}
