//! In-memory task list and the operations the menu and CLI drive.
//!
//! The store owns the list for the whole session and writes the full list
//! back to its [`TaskFile`] after every mutation. When a save fails the
//! in-memory list stays authoritative and the error is handed to the caller.

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Result, TaskError, ValidationError};
use crate::filter::TaskFilter;
use crate::report;
use crate::storage::{SkippedRecord, TaskFile};
use crate::task::{derive_status, parse_due_date, Priority, Status, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Completed,
    AlreadyCompleted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
    pub active_high: usize,
    pub active_medium: usize,
    pub active_low: usize,
}

impl DashboardStats {
    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::Completed => self.completed,
            Status::Overdue => self.overdue,
        }
    }

    pub fn active(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.active_high,
            Priority::Medium => self.active_medium,
            Priority::Low => self.active_low,
        }
    }

    pub fn completion_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    file: TaskFile,
    today: NaiveDate,
    /// `None` once `TaskId::MAX` has been handed out.
    next_id: Option<TaskId>,
    skipped: Vec<SkippedRecord>,
}

impl TaskStore {
    /// Loads `file` and re-derives every status against `today`.
    pub fn load(file: TaskFile, today: NaiveDate) -> Result<Self> {
        let report = file.load()?;
        let mut tasks = report.tasks;
        for task in &mut tasks {
            task.status = derive_status(task, today);
        }
        let next_id = match tasks.iter().map(|t| t.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };

        Ok(Self {
            tasks,
            file,
            today,
            next_id,
            skipped: report.skipped,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Rows dropped while loading.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add(
        &mut self,
        title: &str,
        description: &str,
        due_date: &str,
        priority: &str,
    ) -> Result<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let due_date = parse_due_date(due_date)?;
        let priority: Priority = priority.parse()?;
        let id = self.next_id.ok_or(TaskError::IdsExhausted)?;

        let mut task = Task {
            id,
            title: title.to_string(),
            description: description.trim().to_string(),
            due_date,
            priority,
            status: Status::Pending,
            created_at: Some(now()),
            completed_at: None,
        };
        task.status = derive_status(&task, self.today);
        self.next_id = id.checked_add(1);

        info!(id = task.id, status = %task.status, "task added");
        let index = self.tasks.len();
        self.tasks.push(task);
        self.persist()?;
        Ok(&self.tasks[index])
    }

    pub fn list(&self, filter: TaskFilter) -> impl Iterator<Item = &Task> + '_ {
        let today = self.today;
        self.tasks.iter().filter(move |t| filter.matches(t, today))
    }

    /// Case-insensitive substring search over title and description. An empty
    /// keyword matches nothing.
    pub fn search(&self, keyword: &str) -> impl Iterator<Item = &Task> + '_ {
        let needle = keyword.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(move |t| !needle.is_empty() && t.matches_keyword(&needle))
    }

    pub fn complete(&mut self, id: TaskId) -> Result<Completion> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        if task.is_completed() {
            return Ok(Completion::AlreadyCompleted);
        }
        task.status = Status::Completed;
        task.completed_at = Some(now());
        info!(id, "task completed");

        self.persist()?;
        Ok(Completion::Completed)
    }

    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        let removed = self.tasks.remove(index);
        info!(id, "task deleted");

        self.persist()?;
        Ok(removed)
    }

    pub fn stats(&self) -> DashboardStats {
        self.tasks
            .iter()
            .fold(DashboardStats::default(), |mut stats, task| {
                stats.total += 1;
                match task.status {
                    Status::Pending => stats.pending += 1,
                    Status::Completed => stats.completed += 1,
                    Status::Overdue => stats.overdue += 1,
                }
                if !task.is_completed() {
                    match task.priority {
                        Priority::High => stats.active_high += 1,
                        Priority::Medium => stats.active_medium += 1,
                        Priority::Low => stats.active_low += 1,
                    }
                }
                stats
            })
    }

    /// Writes the plain-text summary to `path`, replacing any existing file.
    pub fn export_summary(&self, path: &Path) -> Result<()> {
        self.export_summary_at(path, now())
    }

    pub fn export_summary_at(&self, path: &Path, generated_at: NaiveDateTime) -> Result<()> {
        let text = report::render(&self.tasks, self.stats(), self.today, generated_at);
        fs::write(path, text).map_err(|err| TaskError::io(path, err))?;
        info!(path = %path.display(), count = self.tasks.len(), "summary exported");
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.file.save(&self.tasks).inspect_err(|err| {
            warn!(error = %err, "failed to save tasks; keeping in-memory state");
        })
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    const HEADER: &str = "id,title,description,due_date,priority,status";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn empty_store() -> (TempDir, TaskStore) {
        let dir = tempdir().unwrap();
        let store = TaskStore::load(TaskFile::new(dir.path().join("tasks.csv")), today()).unwrap();
        (dir, store)
    }

    fn reload(store: &TaskStore) -> TaskStore {
        TaskStore::load(TaskFile::new(store.path()), store.today()).unwrap()
    }

    #[test]
    fn add_assigns_sequential_ids_and_persists() {
        let (_dir, mut store) = empty_store();
        let first = store.add("Buy milk", "", "2024-05-12", "L").unwrap().id;
        let second = store.add("Call mom", "Sunday", "2024-05-12", "m").unwrap().id;

        assert_eq!((first, second), (1, 2));
        let reloaded = reload(&store);
        assert_eq!(reloaded.tasks(), store.tasks());
    }

    #[test]
    fn add_trims_title_and_derives_status() {
        let (_dir, mut store) = empty_store();
        let past = store.add("  Pay bills ", "", "2020-01-01", "High").unwrap();
        assert_eq!(past.title, "Pay bills");
        assert_eq!(past.status, Status::Overdue);
        assert!(past.created_at.is_some());

        let today = store.add("Standup", "", "2024-05-10", "Low").unwrap();
        assert_eq!(today.status, Status::Pending);
    }

    #[test]
    fn invalid_add_leaves_state_and_file_untouched() {
        let (_dir, mut store) = empty_store();

        let err = store.add("   ", "desc", "2024-05-12", "H").unwrap_err();
        assert!(matches!(err, TaskError::Validation(ValidationError::EmptyTitle)));
        let err = store.add("Title", "", "tomorrow", "H").unwrap_err();
        assert!(matches!(err, TaskError::Validation(ValidationError::InvalidDate(_))));
        let err = store.add("Title", "", "2024-05-12", "X").unwrap_err();
        assert!(matches!(err, TaskError::Validation(ValidationError::InvalidPriority(_))));

        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (_dir, mut store) = empty_store();
        store.add("a", "", "2024-06-01", "L").unwrap();
        let last = store.add("b", "", "2024-06-01", "L").unwrap().id;
        store.delete(last).unwrap();

        let next = store.add("c", "", "2024-06-01", "L").unwrap().id;
        assert_eq!(next, last + 1);
    }

    #[test]
    fn highest_possible_id_loads_and_blocks_further_adds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        fs::write(
            &path,
            format!(
                "{HEADER}\n{},Big,,2024-05-20,High,Pending\n",
                TaskId::MAX
            ),
        )
        .unwrap();
        let mut store = TaskStore::load(TaskFile::new(&path), today()).unwrap();
        assert_eq!(store.len(), 1);

        let err = store.add("One more", "", "2024-06-01", "L").unwrap_err();
        assert!(matches!(err, TaskError::IdsExhausted));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn last_id_is_assigned_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        fs::write(
            &path,
            format!(
                "{HEADER}\n{},Almost,,2024-05-20,Low,Pending\n",
                TaskId::MAX - 1
            ),
        )
        .unwrap();
        let mut store = TaskStore::load(TaskFile::new(&path), today()).unwrap();

        let id = store.add("Last", "", "2024-06-01", "L").unwrap().id;
        assert_eq!(id, TaskId::MAX);
        assert!(matches!(
            store.add("Overflow", "", "2024-06-01", "L"),
            Err(TaskError::IdsExhausted)
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn load_recomputes_statuses() {
        let (_dir, mut store) = empty_store();
        store.add("Due soon", "", "2024-05-11", "L").unwrap();
        let done = store.add("Done", "", "2024-05-11", "L").unwrap().id;
        store.complete(done).unwrap();

        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let reloaded = TaskStore::load(TaskFile::new(store.path()), later).unwrap();

        assert_eq!(reloaded.get(1).unwrap().status, Status::Overdue);
        assert_eq!(reloaded.get(done).unwrap().status, Status::Completed);
    }

    #[test]
    fn complete_unknown_id_is_not_found() {
        let (_dir, mut store) = empty_store();
        store.add("a", "", "2024-06-01", "L").unwrap();
        let before = store.tasks().to_vec();

        assert!(matches!(store.complete(99), Err(TaskError::NotFound(99))));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn completing_twice_is_a_noop() {
        let (_dir, mut store) = empty_store();
        let id = store.add("a", "", "2024-06-01", "L").unwrap().id;

        assert_eq!(store.complete(id).unwrap(), Completion::Completed);
        let stamped = store.get(id).unwrap().completed_at;
        assert!(stamped.is_some());

        assert_eq!(store.complete(id).unwrap(), Completion::AlreadyCompleted);
        assert_eq!(store.get(id).unwrap().completed_at, stamped);
    }

    #[test]
    fn delete_removes_exactly_one_from_memory_and_disk() {
        let (_dir, mut store) = empty_store();
        for title in ["a", "b", "c"] {
            store.add(title, "", "2024-06-01", "L").unwrap();
        }
        let total = store.stats().total;

        let removed = store.delete(2).unwrap();
        assert_eq!(removed.title, "b");
        assert_eq!(store.stats().total, total - 1);
        assert!(matches!(store.delete(2), Err(TaskError::NotFound(2))));

        let ids: Vec<_> = reload(&store).tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn search_is_case_insensitive_and_ignores_empty_keyword() {
        let (_dir, mut store) = empty_store();
        store.add("Team Meeting Notes", "", "2024-06-01", "M").unwrap();
        store.add("Groceries", "after the MEETING", "2024-06-01", "L").unwrap();
        store.add("Gym", "", "2024-06-01", "L").unwrap();

        let hits: Vec<_> = store.search("meeting").map(|t| t.id).collect();
        assert_eq!(hits, vec![1, 2]);
        assert_eq!(store.search("").count(), 0);
        assert_eq!(store.search("   ").count(), 0);
    }

    #[test]
    fn list_is_restartable_and_in_insertion_order() {
        let (_dir, mut store) = empty_store();
        store.add("late", "", "2024-05-01", "H").unwrap();
        store.add("later", "", "2024-07-01", "H").unwrap();
        store.add("low", "", "2024-05-02", "L").unwrap();

        let high: Vec<_> = store.list(TaskFilter::HighPriority).map(|t| t.id).collect();
        assert_eq!(high, vec![1, 2]);
        let overdue: Vec<_> = store.list(TaskFilter::Overdue).map(|t| t.id).collect();
        assert_eq!(overdue, vec![1, 3]);
        assert_eq!(store.list(TaskFilter::All).count(), 3);
        assert_eq!(store.list(TaskFilter::All).count(), 3);
    }

    #[test]
    fn stats_count_statuses_and_active_priorities() {
        let (_dir, mut store) = empty_store();
        store.add("a", "", "2024-05-01", "H").unwrap();
        store.add("b", "", "2024-06-01", "H").unwrap();
        store.add("c", "", "2024-06-01", "L").unwrap();
        store.complete(2).unwrap();

        let stats = store.stats();
        assert_eq!(
            stats,
            DashboardStats {
                total: 3,
                pending: 1,
                completed: 1,
                overdue: 1,
                active_high: 1,
                active_medium: 0,
                active_low: 1,
            }
        );
        assert!((stats.completion_percent() - 33.333).abs() < 0.01);
    }

    #[test]
    fn save_failure_keeps_memory_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone").join("tasks.csv");
        let mut store = TaskStore::load(TaskFile::new(&path), today()).unwrap();

        let err = store.add("a", "", "2024-06-01", "L").unwrap_err();
        assert!(matches!(err, TaskError::Io { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn export_to_unwritable_path_fails() {
        let (dir, store) = empty_store();
        let err = store
            .export_summary(&dir.path().join("no-such-dir").join("summary.txt"))
            .unwrap_err();
        assert!(matches!(err, TaskError::Io { .. }));
    }
}
