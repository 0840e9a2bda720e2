use chrono::{DateTime, TimeDelta, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                TrackerError::Validation(format!(
                    "invalid status '{s}'; valid statuses are: todo, in-progress, done"
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh `todo` task stamped with the current time.
    pub fn new(id: u64, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: description.into(),
            status: Status::Todo,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.touch();
    }

    /// Empty arguments leave the corresponding field as it was.
    pub fn apply_update(&mut self, title: &str, description: &str) {
        if !title.is_empty() {
            self.title = title.to_string();
        }
        if !description.is_empty() {
            self.description = description.to_string();
        }
        self.touch();
    }

    /// Refresh `updated_at`, always moving it forward even if the clock has not.
    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + TimeDelta::nanoseconds(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_round_trips_json() {
        let task = Task::new(1, "Test task", "");
        let json = serde_json::to_string_pretty(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, parsed);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
    }

    #[test]
    fn unknown_status_is_rejected_by_serde() {
        let parsed: Result<Status, _> = serde_json::from_str(r#""blocked""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn status_parses_from_str() {
        assert_eq!("todo".parse::<Status>().unwrap(), Status::Todo);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("done".parse::<Status>().unwrap(), Status::Done);

        let err = "in_progress".parse::<Status>().unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn serialized_keys_are_exactly_the_task_fields() {
        let task = Task::new(3, "Keys", "");
        let value = serde_json::to_value(&task).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["created_at", "description", "id", "status", "title", "updated_at"]
        );
    }

    #[test]
    fn new_task_starts_todo_with_equal_timestamps() {
        let task = Task::new(1, "A", "b");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn apply_update_keeps_fields_for_empty_arguments() {
        let mut task = Task::new(1, "Title", "Desc");
        task.apply_update("", "New desc");
        assert_eq!(task.title, "Title");
        assert_eq!(task.description, "New desc");

        task.apply_update("New title", "");
        assert_eq!(task.title, "New title");
        assert_eq!(task.description, "New desc");
    }

    #[test]
    fn mutations_strictly_advance_updated_at() {
        let mut task = Task::new(1, "A", "");
        let created = task.created_at;

        task.set_status(Status::Done);
        let first = task.updated_at;
        assert!(first > created);

        task.apply_update("", "");
        assert!(task.updated_at > first);
        assert_eq!(task.created_at, created);
    }

    #[test]
    fn touch_advances_past_a_future_timestamp() {
        let mut task = Task::new(1, "A", "");
        let future = Utc::now() + TimeDelta::hours(1);
        task.updated_at = future;
        task.set_status(Status::InProgress);
        assert!(task.updated_at > future);
    }
}
