//! Plain-text summary written by the export command.

use chrono::{Days, NaiveDate, NaiveDateTime};
use std::fmt;

use crate::store::DashboardStats;
use crate::task::{Status, Task};

const RULE_WIDTH: usize = 50;
const UPCOMING_DAYS: u64 = 7;
const STATUS_COL: usize = 15;
const TITLE_COL: usize = 30;

pub fn render(
    tasks: &[Task],
    stats: DashboardStats,
    today: NaiveDate,
    generated_at: NaiveDateTime,
) -> String {
    Summary {
        tasks,
        stats,
        today,
        generated_at,
    }
    .to_string()
}

struct Summary<'a> {
    tasks: &'a [Task],
    stats: DashboardStats,
    today: NaiveDate,
    generated_at: NaiveDateTime,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(f, "TASK SUMMARY REPORT")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "Report generated on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f)?;

        writeln!(f, "STATISTICS:")?;
        writeln!(f, "Total Tasks: {}", self.stats.total)?;
        writeln!(f, "Pending: {}", self.stats.pending)?;
        writeln!(f, "Completed: {}", self.stats.completed)?;
        writeln!(f, "Overdue: {}", self.stats.overdue)?;

        for status in Status::ALL {
            writeln!(f)?;
            writeln!(
                f,
                "{} TASKS ({}):",
                status.to_string().to_uppercase(),
                self.stats.count(status)
            )?;
            writeln!(f, "{rule}")?;
            let mut any = false;
            for task in self.tasks.iter().filter(|t| t.status == status) {
                any = true;
                writeln!(
                    f,
                    "{:<STATUS_COL$} {:<TITLE_COL$} Due: {}  Priority: {}",
                    format!("[{}]", task.status),
                    task.title,
                    task.due_date,
                    task.priority
                )?;
                if !task.description.is_empty() {
                    writeln!(
                        f,
                        "{:STATUS_COL$} Description: {}",
                        "",
                        task.description.replace('\n', " ")
                    )?;
                }
            }
            if !any {
                writeln!(f, "(none)")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "UPCOMING TASKS (Next {UPCOMING_DAYS} days):")?;
        writeln!(f, "{rule}")?;
        let horizon = self
            .today
            .checked_add_days(Days::new(UPCOMING_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let mut upcoming: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.status == Status::Pending)
            .filter(|t| (self.today..=horizon).contains(&t.due_date))
            .collect();
        upcoming.sort_by_key(|t| t.due_date);
        if upcoming.is_empty() {
            writeln!(f, "No upcoming tasks in the next {UPCOMING_DAYS} days.")?;
        }
        for task in upcoming {
            writeln!(f, "{} - {} [{}]", task.due_date, task.title, task.priority)?;
        }
        Ok(())
    }
}
