use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub type TaskId = u32;

/// Date format used for due dates, both on disk and at the prompt.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        };
        f.pad(label)
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    /// Accepts the full name or its first letter, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Priority::Low),
            "m" | "medium" => Ok(Priority::Medium),
            "h" | "high" => Ok(Priority::High),
            _ => Err(ValidationError::InvalidPriority(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Status {
    Pending,
    Completed,
    Overdue,
}

impl Status {
    /// Report and dashboard order.
    pub const ALL: [Status; 3] = [Status::Overdue, Status::Pending, Status::Completed];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
            Status::Overdue => "Overdue",
        };
        f.pad(label)
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "completed" => Ok(Status::Completed),
            "overdue" => Ok(Status::Overdue),
            _ => Err(ValidationError::InvalidStatus(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// Signed number of days from `today` until the due date.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn matches_keyword(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self.description.to_lowercase().contains(needle_lowercase)
    }
}

/// Completed is terminal; anything else is Overdue once the due date has
/// passed and Pending otherwise.
pub fn derive_status(task: &Task, today: NaiveDate) -> Status {
    if task.is_completed() {
        Status::Completed
    } else if task.due_date < today {
        Status::Overdue
    } else {
        Status::Pending
    }
}

pub fn parse_due_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Optional `YYYY-MM-DD HH:MM:SS` columns. Reading also accepts the ISO `T`
/// separator and fractional seconds; anything else reads as absent so a bad
/// timestamp never costs the task itself.
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const ACCEPTED: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.collect_str(&ts.format(FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let parsed = parse(raw);
        if parsed.is_none() {
            warn!(value = raw, "ignoring unparseable timestamp");
        }
        Ok(parsed)
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        ACCEPTED
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn task(due: &str, status: Status) -> Task {
        Task {
            id: 1,
            title: "Write report".to_string(),
            description: String::new(),
            due_date: date(due),
            priority: Priority::Medium,
            status,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn pending_task_past_due_becomes_overdue() {
        let t = task("2024-03-01", Status::Pending);
        assert_eq!(derive_status(&t, date("2024-03-02")), Status::Overdue);
    }

    #[test]
    fn task_due_today_is_not_overdue() {
        let t = task("2024-03-02", Status::Pending);
        assert_eq!(derive_status(&t, date("2024-03-02")), Status::Pending);
    }

    #[test]
    fn completed_task_never_becomes_overdue() {
        let t = task("2000-01-01", Status::Completed);
        assert_eq!(derive_status(&t, date("2024-03-02")), Status::Completed);
    }

    #[test]
    fn overdue_task_with_future_date_reverts_to_pending() {
        let t = task("2030-01-01", Status::Overdue);
        assert_eq!(derive_status(&t, date("2024-03-02")), Status::Pending);
    }

    #[test]
    fn priority_parses_names_and_initials() {
        assert_eq!("h".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(ValidationError::InvalidPriority(p)) if p == "urgent"
        ));
    }

    #[test]
    fn status_parses_any_case() {
        assert_eq!("pending".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!("COMPLETED".parse::<Status>().unwrap(), Status::Completed);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn timestamps_accept_space_and_t_separators() {
        let expected = date("2024-05-01").and_hms_opt(9, 30, 0);
        assert_eq!(timestamp::parse("2024-05-01 09:30:00"), expected);
        assert_eq!(timestamp::parse("2024-05-01T09:30:00"), expected);
        let fractional = timestamp::parse("2024-05-01T09:30:00.250").unwrap();
        assert_eq!(fractional.date(), date("2024-05-01"));
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn due_date_requires_iso_format() {
        assert_eq!(parse_due_date(" 2024-02-29 ").unwrap(), date("2024-02-29"));
        assert!(parse_due_date("2023-02-29").is_err());
        assert!(parse_due_date("02/03/2024").is_err());
        assert!(parse_due_date("").is_err());
    }

    #[test]
    fn keyword_match_covers_title_and_description() {
        let mut t = task("2024-03-01", Status::Pending);
        t.title = "Team Meeting Notes".to_string();
        t.description = "Bring the Q3 numbers".to_string();
        assert!(t.matches_keyword("meeting"));
        assert!(t.matches_keyword("q3"));
        assert!(!t.matches_keyword("budget"));
    }
}
