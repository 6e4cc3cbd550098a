use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::io;
use todo_manager::cli::{self, Cli};
use todo_manager::config::Config;
use todo_manager::ui::Menu;
use todo_manager::{TaskFile, TaskStore};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TODO_MANAGER_LOG";

fn main() -> Result<()> {
    if let Ok(directive) = std::env::var(LOG_ENV) {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(directive))
            .with_writer(io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let path = cli.file.unwrap_or_else(|| config.storage_path.clone());

    // An unreadable task file is fatal: continuing would overwrite it on the
    // next save.
    let today = Local::now().date_naive();
    let mut store = TaskStore::load(TaskFile::new(&path), today)
        .with_context(|| format!("Cannot open task file {}", path.display()))?;

    match cli.command {
        Some(command) => {
            for record in store.skipped() {
                eprintln!("Warning: skipped line {}: {}", record.line, record.reason);
            }
            cli::run(&store, command, &config, &mut io::stdout().lock())
        }
        None => {
            let stdin = io::stdin();
            let mut menu = Menu::new(&mut store, stdin.lock(), io::stdout())
                .color(config.color && !cli.no_color)
                .export_path(config.export_path.clone());
            menu.run()?;
            Ok(())
        }
    }
}
