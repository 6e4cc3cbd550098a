//! Interactive numbered menu over any line-based input and output.

use crossterm::style::{Color, Stylize};
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::error::TaskError;
use crate::filter::TaskFilter;
use crate::store::{Completion, TaskStore};
use crate::task::{Priority, Status, Task, TaskId};

const HEADER_WIDTH: usize = 60;
const COL_ID: usize = 6;
const COL_TITLE: usize = 30;
const COL_DUE: usize = 22;
const COL_PRIORITY: usize = 10;
const COL_STATUS: usize = 14;

const MENU: [&str; 8] = [
    "Add Task",
    "List / Filter Tasks",
    "Search Tasks",
    "Mark Task as Completed",
    "Delete Task",
    "Dashboard",
    "Export Summary",
    "Quit",
];

pub struct Menu<'a, R, W> {
    store: &'a mut TaskStore,
    input: R,
    out: W,
    color: bool,
    export_path: String,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a mut TaskStore, input: R, out: W) -> Self {
        Self {
            store,
            input,
            out,
            color: false,
            export_path: "task_summary.txt".to_string(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn export_path(mut self, path: impl Into<String>) -> Self {
        self.export_path = path.into();
        self
    }

    /// Runs until the user picks Quit or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        self.banner("TO-DO LIST MANAGER")?;
        self.report_skipped()?;

        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", self.paint("=== MAIN MENU ===", Color::Cyan))?;
            for (i, label) in MENU.iter().enumerate() {
                writeln!(self.out, "{}. {}", i + 1, label)?;
            }
            let Some(choice) = self.prompt(&format!("Select an option (1-{})", MENU.len()))? else {
                break;
            };
            debug!(%choice, "menu selection");

            match choice.as_str() {
                "1" => self.add_task()?,
                "2" => self.filter_tasks()?,
                "3" => self.search_tasks()?,
                "4" => self.complete_task()?,
                "5" => self.delete_task()?,
                "6" => self.dashboard()?,
                "7" => self.export_summary()?,
                "8" | "q" | "Q" => break,
                _ => self.error(format!(
                    "Invalid choice! Please select a valid option (1-{})",
                    MENU.len()
                ))?,
            }
        }

        writeln!(self.out)?;
        writeln!(self.out, "{}", self.paint("Goodbye!", Color::Green))?;
        Ok(())
    }

    fn add_task(&mut self) -> io::Result<()> {
        self.banner("ADD NEW TASK")?;
        let Some(title) = self.prompt("Enter task title")? else {
            return Ok(());
        };
        let Some(description) = self.prompt("Enter task description (optional)")? else {
            return Ok(());
        };
        let today = self.store.today();
        writeln!(self.out, "{}", self.paint(format!("Today's date: {today}"), Color::Blue))?;
        let Some(due_date) = self.prompt("Enter due date (YYYY-MM-DD)")? else {
            return Ok(());
        };
        let Some(priority) = self.prompt("Enter priority (H/M/L)")? else {
            return Ok(());
        };

        match self.store.add(&title, &description, &due_date, &priority) {
            Ok(task) => {
                let line = format!("Task added successfully! (ID: {})", task.id);
                let due = due_hint(task, today);
                self.success(line)?;
                writeln!(self.out, "{due}")?;
            }
            Err(err) => self.store_error(err)?,
        }
        Ok(())
    }

    fn filter_tasks(&mut self) -> io::Result<()> {
        self.banner("FILTER TASKS")?;
        for (i, filter) in TaskFilter::ALL.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, filter)?;
        }
        let question = format!("Select filter option (1-{})", TaskFilter::ALL.len());
        let Some(choice) = self.prompt(&question)? else {
            return Ok(());
        };
        let filter = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| TaskFilter::ALL.get(i).copied());
        let Some(filter) = filter else {
            return self.error("Invalid choice!");
        };

        self.banner(&filter.to_string().to_uppercase())?;
        let tasks: Vec<Task> = self.store.list(filter).cloned().collect();
        self.display_tasks(&tasks)
    }

    fn search_tasks(&mut self) -> io::Result<()> {
        self.banner("SEARCH TASKS")?;
        let Some(keyword) = self.prompt("Enter search keyword")? else {
            return Ok(());
        };
        if keyword.is_empty() {
            return self.error("Search keyword cannot be empty!");
        }

        let matches: Vec<Task> = self.store.search(&keyword).cloned().collect();
        self.banner(&format!("SEARCH RESULTS FOR '{}'", keyword.to_uppercase()))?;
        if matches.is_empty() {
            return self.notice(format!("No tasks found matching '{keyword}'"));
        }
        self.display_tasks(&matches)
    }

    fn complete_task(&mut self) -> io::Result<()> {
        self.banner("MARK TASK AS COMPLETED")?;
        let open: Vec<Task> = self
            .store
            .tasks()
            .iter()
            .filter(|t| !t.is_completed())
            .cloned()
            .collect();
        if open.is_empty() {
            return self.notice("No pending tasks to complete!");
        }
        writeln!(self.out, "Pending/Overdue tasks:")?;
        for task in &open {
            self.id_line(task)?;
        }

        let Some(id) = self.prompt_id("Enter task ID to mark as completed")? else {
            return Ok(());
        };
        match self.store.complete(id) {
            Ok(Completion::Completed) => {
                let title = self.store.get(id).map(|t| t.title.clone()).unwrap_or_default();
                self.success(format!("Task '{title}' marked as completed!"))
            }
            Ok(Completion::AlreadyCompleted) => self.notice("Task is already completed!"),
            Err(err) => self.store_error(err),
        }
    }

    fn delete_task(&mut self) -> io::Result<()> {
        self.banner("DELETE TASK")?;
        if self.store.is_empty() {
            return self.notice("No tasks to delete!");
        }
        writeln!(self.out, "Current tasks:")?;
        let all = self.store.tasks().to_vec();
        for task in &all {
            self.id_line(task)?;
        }

        let Some(id) = self.prompt_id("Enter task ID to delete")? else {
            return Ok(());
        };
        let Some(task) = self.store.get(id).cloned() else {
            return self.store_error(TaskError::NotFound(id));
        };
        writeln!(self.out, "Task to delete:")?;
        writeln!(self.out, "  Title: {}", task.title)?;
        writeln!(self.out, "  Due date: {}", task.due_date)?;
        writeln!(self.out, "  Status: {}", task.status)?;

        let confirm = self.prompt("Are you sure you want to delete this task? (yes/no)")?;
        if !matches!(confirm.as_deref().map(str::to_ascii_lowercase).as_deref(), Some("yes")) {
            return self.notice("Deletion cancelled.");
        }
        match self.store.delete(id) {
            Ok(_) => self.success("Task deleted successfully!"),
            Err(err) => self.store_error(err),
        }
    }

    fn dashboard(&mut self) -> io::Result<()> {
        self.banner("TASK DASHBOARD")?;
        let stats = self.store.stats();
        if stats.total == 0 {
            return self.notice("No tasks yet! Start by adding your first task.");
        }

        writeln!(self.out, "OVERVIEW")?;
        writeln!(self.out, "{}", "-".repeat(40))?;
        writeln!(self.out, "Total Tasks: {}", stats.total)?;
        writeln!(self.out, "{}", self.paint(format!("Pending: {}", stats.pending), Color::Yellow))?;
        writeln!(
            self.out,
            "{}",
            self.paint(
                format!("Completed: {} ({:.1}%)", stats.completed, stats.completion_percent()),
                Color::Green
            )
        )?;
        writeln!(self.out, "{}", self.paint(format!("Overdue: {}", stats.overdue), Color::Red))?;

        writeln!(self.out)?;
        writeln!(self.out, "ACTIVE TASKS BY PRIORITY")?;
        writeln!(self.out, "{}", "-".repeat(40))?;
        for priority in Priority::ALL {
            let line = format!("{}: {}", priority, stats.active(priority));
            writeln!(self.out, "{}", self.paint(line, priority_color(priority)))?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "TODAY'S TASKS")?;
        writeln!(self.out, "{}", "-".repeat(40))?;
        let today: Vec<String> = self
            .store
            .list(TaskFilter::DueToday)
            .filter(|t| !t.is_completed())
            .map(|t| format!("[{}] {}", t.priority, t.title))
            .collect();
        if today.is_empty() {
            writeln!(self.out, "{}", self.paint("No tasks due today!", Color::Green))?;
        }
        for line in today {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn export_summary(&mut self) -> io::Result<()> {
        self.banner("EXPORT SUMMARY")?;
        let default = self.export_path.clone();
        let Some(name) = self.prompt(&format!("Enter filename for export (default: {default})"))?
        else {
            return Ok(());
        };
        let mut name = if name.is_empty() { default } else { name };
        if !name.ends_with(".txt") {
            name.push_str(".txt");
        }

        let path = PathBuf::from(&name);
        match self.store.export_summary(&path) {
            Ok(()) => self.success(format!("Summary exported successfully to {name}")),
            Err(err) => self.error(format!("Error exporting summary: {err}")),
        }
    }

    fn display_tasks(&mut self, tasks: &[Task]) -> io::Result<()> {
        if tasks.is_empty() {
            return self.notice("No tasks to display!");
        }
        let today = self.store.today();
        let width = COL_ID + COL_TITLE + COL_DUE + COL_PRIORITY + COL_STATUS;

        writeln!(self.out, "{}", "-".repeat(width))?;
        writeln!(
            self.out,
            "{:<COL_ID$}{:<COL_TITLE$}{:<COL_DUE$}{:<COL_PRIORITY$}{:<COL_STATUS$}",
            "ID", "Title", "Due Date", "Priority", "Status"
        )?;
        writeln!(self.out, "{}", "-".repeat(width))?;

        for task in tasks {
            let due = match task.days_until_due(today) {
                _ if task.is_completed() => task.due_date.to_string(),
                d if d < 0 => format!("{} ({}d late)", task.due_date, -d),
                0 => format!("{} (Today!)", task.due_date),
                1 => format!("{} (Tomorrow)", task.due_date),
                d => format!("{} ({d}d left)", task.due_date),
            };
            let marker = match task.status {
                Status::Overdue => "[!]",
                Status::Completed => "[x]",
                Status::Pending => "[-]",
            };
            let priority = format!("{:<COL_PRIORITY$}", task.priority);
            let status = format!("{:<COL_STATUS$}", format!("{marker} {}", task.status));
            writeln!(
                self.out,
                "{:<COL_ID$}{:<COL_TITLE$}{:<COL_DUE$}{}{}",
                task.id,
                truncate(&task.title, COL_TITLE - 2),
                due,
                self.paint(priority, priority_color(task.priority)),
                self.paint(status, status_color(task.status)),
            )?;
        }
        writeln!(self.out, "{}", "-".repeat(width))?;

        let count = |s: Status| tasks.iter().filter(|t| t.status == s).count();
        writeln!(
            self.out,
            "Summary: Pending: {}  Completed: {}  Overdue: {}  Total: {}",
            count(Status::Pending),
            count(Status::Completed),
            count(Status::Overdue),
            tasks.len()
        )
    }

    fn id_line(&mut self, task: &Task) -> io::Result<()> {
        let title = self.paint(&task.title, status_color(task.status));
        writeln!(self.out, "  ID: {:<3} {}", task.id, title)
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}: ", self.paint(message, Color::Yellow))?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_id(&mut self, message: &str) -> io::Result<Option<TaskId>> {
        let Some(raw) = self.prompt(message)? else {
            return Ok(None);
        };
        match raw.parse::<TaskId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                self.error("Invalid task ID!")?;
                Ok(None)
            }
        }
    }

    fn report_skipped(&mut self) -> io::Result<()> {
        let skipped = self.store.skipped().to_vec();
        for record in skipped {
            self.notice(format!(
                "Warning: skipped line {} of {}: {}",
                record.line,
                self.store.path().display(),
                record.reason
            ))?;
        }
        Ok(())
    }

    fn store_error(&mut self, err: TaskError) -> io::Result<()> {
        match err {
            TaskError::Io { .. } | TaskError::Csv { .. } => self.error(format!(
                "Could not save tasks ({err}); changes are kept for this session."
            )),
            other => self.error(format!("Error: {other}")),
        }
    }

    fn banner(&mut self, text: &str) -> io::Result<()> {
        let rule = self.paint("=".repeat(HEADER_WIDTH), Color::Cyan);
        writeln!(self.out)?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "{:^HEADER_WIDTH$}", text)?;
        writeln!(self.out, "{rule}")
    }

    fn success(&mut self, text: impl Display) -> io::Result<()> {
        let line = self.paint(text, Color::Green);
        writeln!(self.out, "{line}")
    }

    fn notice(&mut self, text: impl Display) -> io::Result<()> {
        let line = self.paint(text, Color::Yellow);
        writeln!(self.out, "{line}")
    }

    fn error(&mut self, text: impl Display) -> io::Result<()> {
        let line = self.paint(text, Color::Red);
        writeln!(self.out, "{line}")
    }

    fn paint(&self, text: impl Display, color: Color) -> String {
        if self.color {
            text.to_string().with(color).to_string()
        } else {
            text.to_string()
        }
    }
}

fn due_hint(task: &Task, today: chrono::NaiveDate) -> String {
    match task.days_until_due(today) {
        d if d < 0 => format!("Already {} day(s) overdue.", -d),
        0 => "Due today!".to_string(),
        1 => "Due tomorrow!".to_string(),
        d => format!("Due in {d} days."),
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Overdue => Color::Red,
        Status::Completed => Color::Green,
        Status::Pending => Color::Yellow,
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    }
}
