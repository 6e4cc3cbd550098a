use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use std::fmt;

use crate::task::{Priority, Status, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
    DueToday,
    /// Due today or tomorrow.
    DueSoon,
    HighPriority,
}

impl TaskFilter {
    /// Menu order.
    pub const ALL: [TaskFilter; 7] = [
        TaskFilter::All,
        TaskFilter::Pending,
        TaskFilter::Completed,
        TaskFilter::Overdue,
        TaskFilter::DueToday,
        TaskFilter::DueSoon,
        TaskFilter::HighPriority,
    ];

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => task.status == Status::Pending,
            TaskFilter::Completed => task.status == Status::Completed,
            TaskFilter::Overdue => task.status == Status::Overdue,
            TaskFilter::DueToday => task.due_date == today,
            TaskFilter::DueSoon => {
                let tomorrow = today.checked_add_days(Days::new(1));
                task.due_date == today || Some(task.due_date) == tomorrow
            }
            TaskFilter::HighPriority => task.priority == Priority::High,
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskFilter::All => "All tasks",
            TaskFilter::Pending => "Pending tasks",
            TaskFilter::Completed => "Completed tasks",
            TaskFilter::Overdue => "Overdue tasks",
            TaskFilter::DueToday => "Tasks due today",
            TaskFilter::DueSoon => "Tasks due today or tomorrow",
            TaskFilter::HighPriority => "High priority tasks",
        };
        f.write_str(label)
    }
}
