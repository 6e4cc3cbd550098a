use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskId;

/// Bad input to Add. State is never touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("invalid due date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid priority `{0}`, expected H, M or L")]
    InvalidPriority(String),
    #[error("invalid status `{0}`, expected Pending, Completed or Overdue")]
    InvalidStatus(String),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task with ID {0} not found")]
    NotFound(TaskId),

    #[error("no task ids left: ID {} is already in use", TaskId::MAX)]
    IdsExhausted,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is not a task file: missing column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

impl TaskError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TaskError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        TaskError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
