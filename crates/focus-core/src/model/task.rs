use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Storage-assigned task identifier. Never reused, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse::<i64>().map(Self)
    }
}

/// The five task statuses.
///
/// `Todo` and `Blocked` are the unfinished statuses that roll over into the
/// next tracked day. `Stashed` is written only by rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Done,
    Blocked,
    Deleted,
    Stashed,
}

impl TaskStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Todo,
        Self::Done,
        Self::Blocked,
        Self::Deleted,
        Self::Stashed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Done => "done",
            Self::Blocked => "blocked",
            Self::Deleted => "deleted",
            Self::Stashed => "stashed",
        }
    }

    /// Whether a task in this status is carried into the next tracked day.
    #[must_use]
    pub const fn is_unfinished(self) -> bool {
        matches!(self, Self::Todo | Self::Blocked)
    }

    /// Whether a caller may request this status through an update.
    #[must_use]
    pub const fn is_user_assignable(self) -> bool {
        !matches!(self, Self::Stashed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a status from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub got: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid status: '{}'", self.got)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "done" => Ok(Self::Done),
            "blocked" => Ok(Self::Blocked),
            "deleted" => Ok(Self::Deleted),
            "stashed" => Ok(Self::Stashed),
            _ => Err(ParseStatusError { got: s.to_string() }),
        }
    }
}

/// One task instance, bound to exactly one day.
///
/// `parent_task` is a weak back-reference by id to the instance this one was
/// rolled over from; resolve it through a [`TaskStore`](crate::store::TaskStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub details: Option<String>,
    pub status: TaskStatus,
    pub day: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task: Option<TaskId>,
}

impl Task {
    /// Non-empty details, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref().filter(|d| !d.trim().is_empty())
    }

    #[must_use]
    pub const fn is_rolled_over(&self) -> bool {
        self.parent_task.is_some()
    }
}

/// Insert payload handed to storage; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub details: Option<String>,
    pub day: NaiveDate,
    pub status: TaskStatus,
    pub parent_task: Option<TaskId>,
}

impl NewTask {
    /// A fresh `Todo` task on `day`.
    #[must_use]
    pub fn todo(title: impl Into<String>, details: Option<String>, day: NaiveDate) -> Self {
        Self {
            title: title.into(),
            details,
            day,
            status: TaskStatus::Todo,
            parent_task: None,
        }
    }

    /// The successor of `source` on `day`: same title and details, status
    /// `Todo`, linked back to `source`.
    #[must_use]
    pub fn successor_of(source: &Task, day: NaiveDate) -> Self {
        Self {
            title: source.title.clone(),
            details: source.details.clone(),
            day,
            status: TaskStatus::Todo,
            parent_task: Some(source.id),
        }
    }
}
