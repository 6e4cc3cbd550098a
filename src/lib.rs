//! Single-user task tracker backed by a CSV file.

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod report;
pub mod storage;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{TaskError, ValidationError};
pub use filter::TaskFilter;
pub use storage::TaskFile;
pub use store::{Completion, DashboardStats, TaskStore};
pub use task::{derive_status, Priority, Status, Task, TaskId};
