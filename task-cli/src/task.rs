use crate::error::TaskError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Layout of `createdAt` and `updatedAt` in the backing file, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: u32,
    description: String,
    status: Status,
    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    updated_at: NaiveDateTime,
}

impl Task {
    /// Builds a task whose creation and update times are both `now`.
    pub fn new(id: u32, description: String, status: Status, now: NaiveDateTime) -> Self {
        Self {
            id,
            description,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub(crate) fn set_description(&mut self, description: String, now: NaiveDateTime) {
        self.description = description;
        self.touch(now);
    }

    pub(crate) fn set_status(&mut self, status: Status, now: NaiveDateTime) {
        self.status = status;
        self.touch(now);
    }

    // updatedAt never moves behind createdAt, even if the clock does.
    fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = now.max(self.created_at);
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Created At: {}", self.created_at.format(TIMESTAMP_FORMAT))?;
        write!(f, "Updated At: {}", self.updated_at.format(TIMESTAMP_FORMAT))
    }
}

#[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TaskError::InvalidStatus(s.to_string()))
    }
}

/// Selection applied by the list operations.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum StatusFilter {
    All,
    Completed,
    Uncompleted,
    InProgress,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.status == Status::Done,
            StatusFilter::Uncompleted => task.status != Status::Done,
            StatusFilter::InProgress => task.status == Status::InProgress,
        }
    }
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    #[test]
    fn test_new_task_has_equal_timestamps() {
        let task = Task::new(7, "Write docs".to_string(), Status::Todo, at(12, 0, 0));

        assert_eq!(task.id(), 7);
        assert_eq!(task.description(), "Write docs");
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(task.created_at(), task.updated_at());
    }

    #[test]
    fn test_set_description_refreshes_updated_at_only() {
        let mut task = Task::new(0, "old".to_string(), Status::Todo, at(12, 0, 0));

        task.set_description("new".to_string(), at(12, 0, 5));

        assert_eq!(task.description(), "new");
        assert_eq!(task.created_at(), at(12, 0, 0));
        assert_eq!(task.updated_at(), at(12, 0, 5));
    }

    #[test]
    fn test_updated_at_never_precedes_created_at() {
        let mut task = Task::new(0, "t".to_string(), Status::Todo, at(12, 0, 0));

        task.set_status(Status::Done, at(11, 0, 0));

        assert_eq!(task.status(), Status::Done);
        assert_eq!(task.updated_at(), task.created_at());
    }

    #[test]
    fn test_serializes_with_camel_case_keys_and_plain_timestamps() {
        let task = Task::new(1, "two".to_string(), Status::InProgress, at(8, 30, 0));

        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "description": "two",
                "status": "in-progress",
                "createdAt": "2020-01-01 08:30:00",
                "updatedAt": "2020-01-01 08:30:00"
            })
        );
    }

    #[test]
    fn test_deserializes_any_key_order() {
        let json = r#"{
            "updatedAt": "2020-01-01 00:00:09",
            "status": "done",
            "createdAt": "2020-01-01 00:00:00",
            "description": "a",
            "id": 3
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id(), 3);
        assert_eq!(task.status(), Status::Done);
        assert_eq!(task.updated_at(), at(0, 0, 9));
    }

    #[test]
    fn test_rejects_unknown_status_in_json() {
        let json = r#"{"id":0,"description":"a","status":"later","createdAt":"2020-01-01 00:00:00","updatedAt":"2020-01-01 00:00:00"}"#;

        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("todo".parse::<Status>().unwrap(), Status::Todo);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("done".parse::<Status>().unwrap(), Status::Done);
    }

    #[test]
    fn test_status_from_str_is_case_sensitive() {
        let err = "Done".parse::<Status>().unwrap_err();

        assert!(matches!(err, TaskError::InvalidStatus(ref s) if s == "Done"));
    }

    #[test]
    fn test_filters() {
        let todo = Task::new(0, "a".to_string(), Status::Todo, at(0, 0, 0));
        let doing = Task::new(1, "b".to_string(), Status::InProgress, at(0, 0, 0));
        let done = Task::new(2, "c".to_string(), Status::Done, at(0, 0, 0));

        assert!([&todo, &doing, &done].iter().all(|t| StatusFilter::All.matches(t)));
        assert!(StatusFilter::Completed.matches(&done));
        assert!(!StatusFilter::Completed.matches(&doing));
        assert!(StatusFilter::Uncompleted.matches(&todo));
        assert!(StatusFilter::Uncompleted.matches(&doing));
        assert!(!StatusFilter::Uncompleted.matches(&done));
        assert!(StatusFilter::InProgress.matches(&doing));
        assert!(!StatusFilter::InProgress.matches(&todo));
    }

    #[test]
    fn test_display_lists_every_field() {
        let task = Task::new(4, "Buy milk".to_string(), Status::Done, at(9, 5, 1));

        assert_eq!(
            format!("{}", task),
            "ID: 4\nDescription: Buy milk\nStatus: done\nCreated At: 2020-01-01 09:05:01\nUpdated At: 2020-01-01 09:05:01"
        );
    }
}
