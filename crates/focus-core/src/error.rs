use crate::model::{TaskId, TaskStatus};
use chrono::NaiveDate;
use std::fmt;

/// Machine-readable error codes for scripts and JSON consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TaskNotFound,
    EmptyTitle,
    ReservedStatus,
    MissingDetails,
    StashedIsFinal,
    MissingTaskId,
    CorruptLineage,
    StorageFailure,
    CorruptRow,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::EmptyTitle => "E2002",
            Self::ReservedStatus => "E2003",
            Self::MissingDetails => "E2004",
            Self::StashedIsFinal => "E2005",
            Self::MissingTaskId => "E2006",
            Self::CorruptLineage => "E3001",
            Self::StorageFailure => "E5001",
            Self::CorruptRow => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Tracker not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::EmptyTitle => "Task title is empty",
            Self::ReservedStatus => "Status is reserved for rollover",
            Self::MissingDetails => "Task has no details",
            Self::StashedIsFinal => "Task was carried over and is final",
            Self::MissingTaskId => "No task id given",
            Self::CorruptLineage => "Task lineage is corrupt",
            Self::StorageFailure => "Storage operation failed",
            Self::CorruptRow => "Stored task row could not be decoded",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `focus init` to create the config and database."),
            Self::ConfigParseError => Some("Fix the syntax of the focus config.toml and retry."),
            Self::TaskNotFound => Some("Use `focus status` to list today's task ids."),
            Self::EmptyTitle => Some("Give the task a non-empty title."),
            Self::ReservedStatus => {
                Some("Use one of todo, done, blocked, deleted; stashing happens on rollover.")
            }
            Self::MissingDetails => {
                Some("Add details with `focus add <title> --details <text>`.")
            }
            Self::StashedIsFinal => {
                Some("Change the carried-over copy on the later day instead; see `focus log <id>`.")
            }
            Self::MissingTaskId => Some("Pass a task id, e.g. `focus done 3`."),
            Self::CorruptLineage => {
                Some("Inspect the tasks table. Parent links must point to earlier days.")
            }
            Self::StorageFailure => Some("Check the database path, disk space, and permissions."),
            Self::CorruptRow => Some("The database was edited by hand or by a newer version."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures raised by a [`TaskStore`](crate::store::TaskStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted value could not be decoded into the model.
    #[error("corrupt value in column {column}: '{value}'")]
    CorruptRow { column: &'static str, value: String },

    /// Failure reported by a non-SQLite backend.
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CorruptRow { .. } => ErrorCode::CorruptRow,
            Self::Sqlite(_) | Self::Io(_) | Self::Backend(_) => ErrorCode::StorageFailure,
        }
    }
}

/// Input rejected before any storage write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("status '{0}' is reserved for rollover and cannot be requested")]
    ReservedStatus(TaskStatus),

    /// The task was stashed by a rollover; its successor carries the work.
    #[error("stashed tasks were carried over to a later day and cannot be changed")]
    StashedIsFinal,
}

impl ValidationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyTitle => ErrorCode::EmptyTitle,
            Self::ReservedStatus(_) => ErrorCode::ReservedStatus,
            Self::StashedIsFinal => ErrorCode::StashedIsFinal,
        }
    }
}

/// Top-level error for tracker and history operations.
#[derive(Debug, thiserror::Error)]
pub enum FocusError {
    #[error("Task {task_id} does not exist on {day}")]
    TaskNotFound { task_id: TaskId, day: NaiveDate },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A lineage walk revisited a task or failed to move to an earlier day.
    #[error("lineage of task {task_id} is corrupt")]
    CorruptLineage { task_id: TaskId },
}

impl FocusError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TaskNotFound { .. } => ErrorCode::TaskNotFound,
            Self::Validation(e) => e.code(),
            Self::Storage(e) => e.code(),
            Self::CorruptLineage { .. } => ErrorCode::CorruptLineage,
        }
    }

    /// Remediation hint derived from the error code.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.code().hint().unwrap_or(self.code().message()).to_string()
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound { .. })
    }

    /// Rejected input, as opposed to a storage or lineage failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<rusqlite::Error> for FocusError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Sqlite(err))
    }
}
