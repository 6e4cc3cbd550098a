//! CSV flat-file persistence for the task list.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Result, TaskError};
use crate::task::Task;

pub const HEADER: [&str; 8] = [
    "id",
    "title",
    "description",
    "due_date",
    "priority",
    "status",
    "created_at",
    "completed_at",
];

/// Columns a row cannot do without. The timestamp columns are optional so
/// files written before they existed still load.
const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "title",
    "description",
    "due_date",
    "priority",
    "status",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub tasks: Vec<Task>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every well-formed row. A missing file is an empty list; a file
    /// that exists but cannot be read is an error.
    pub fn load(&self) -> Result<LoadReport> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task file absent, starting empty");
                return Ok(LoadReport::default());
            }
            Err(err) => return Err(TaskError::io(&self.path, err)),
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader
            .headers()
            .map_err(|err| TaskError::csv(&self.path, err))?
            .clone();
        if headers.is_empty() {
            return Ok(LoadReport::default());
        }
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(TaskError::MissingColumn {
                    path: self.path.clone(),
                    column,
                });
            }
        }

        let mut report = LoadReport::default();
        let mut seen = HashSet::new();
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(TaskError::csv(&self.path, err)),
                Err(err) => {
                    let line = err.position().map(|p| p.line()).unwrap_or_default();
                    report.skip(line, err.to_string());
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let task: Task = match record.deserialize(Some(&headers)) {
                Ok(task) => task,
                Err(err) => {
                    report.skip(line, err.to_string());
                    continue;
                }
            };
            if task.title.trim().is_empty() {
                report.skip(line, "empty title".to_string());
                continue;
            }
            if !seen.insert(task.id) {
                report.skip(line, format!("duplicate id {}", task.id));
                continue;
            }
            report.tasks.push(task);
        }

        debug!(
            path = %self.path.display(),
            loaded = report.tasks.len(),
            skipped = report.skipped.len(),
            "loaded task file"
        );
        Ok(report)
    }

    /// Writes the whole list to a temporary file beside the target and moves
    /// it into place, so the target is either the old or the new content.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir).map_err(|err| TaskError::io(dir, err))?;

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file());
            writer
                .write_record(HEADER)
                .map_err(|err| TaskError::csv(&self.path, err))?;
            for task in tasks {
                writer
                    .serialize(task)
                    .map_err(|err| TaskError::csv(&self.path, err))?;
            }
            writer
                .flush()
                .map_err(|err| TaskError::io(&self.path, err))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|err| TaskError::io(&self.path, err))?;
        temp.persist(&self.path)
            .map_err(|err| TaskError::io(&self.path, err.error))?;

        debug!(path = %self.path.display(), count = tasks.len(), "saved task file");
        Ok(())
    }
}

impl LoadReport {
    fn skip(&mut self, line: u64, reason: String) {
        warn!(line, %reason, "skipping malformed task record");
        self.skipped.push(SkippedRecord { line, reason });
    }
}
