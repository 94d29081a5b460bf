//! Canonical SQLite schema for the task tracker.
//!
//! - `tasks` holds every task instance ever created; rows are never deleted
//! - `parent_task_id` links a rolled-over task to the instance it came from
//! - `tracker_meta` records the schema version alongside `PRAGMA user_version`

/// Migration v1: task table plus tracker metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    task_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    details TEXT,
    status TEXT NOT NULL DEFAULT 'todo'
        CHECK (status IN ('todo', 'done', 'blocked', 'deleted', 'stashed')),
    day TEXT NOT NULL CHECK (day GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]'),
    parent_task_id INTEGER REFERENCES tasks(task_id),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (parent_task_id IS NULL OR parent_task_id <> task_id)
);

CREATE TABLE IF NOT EXISTS tracker_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO tracker_meta (id, schema_version, created_at_us)
VALUES (1, 1, 0);
";

/// Migration v2: read-path indexes for day listings and lineage lookups.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_tasks_day
    ON tasks(day, task_id);

CREATE INDEX IF NOT EXISTS idx_tasks_parent
    ON tasks(parent_task_id);
";

/// Indexes expected after all migrations have run.
pub const REQUIRED_INDEXES: &[&str] = &["idx_tasks_day", "idx_tasks_parent"];
