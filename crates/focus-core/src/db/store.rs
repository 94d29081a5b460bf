//! [`TaskStore`] backed by the SQLite `tasks` table.

use crate::error::StorageError;
use crate::model::{NewTask, Task, TaskId, TaskStatus};
use crate::store::TaskStore;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use std::path::Path;

const DAY_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str =
    "task_id, title, details, status, day, parent_task_id, created_at_us";

/// Durable task store over one SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already-migrated connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) the database at `path` and migrate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        super::open_database(path).map(Self::new)
    }

    /// Fresh in-memory database with the full schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        super::open_in_memory().map(Self::new)
    }

    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }
}

pub(crate) fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn parse_day(raw: &str, idx: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status_raw: String = row.get(3)?;
    let day_raw: String = row.get(4)?;
    let created_at_us: i64 = row.get(6)?;

    let status = status_raw.parse::<TaskStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
    })?;
    let created_at = DateTime::<Utc>::from_timestamp_micros(created_at_us).ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(6, created_at_us)
    })?;

    Ok(Task {
        id: TaskId(row.get(0)?),
        title: row.get(1)?,
        details: row.get(2)?,
        status,
        day: parse_day(&day_raw, 4)?,
        created_at,
        parent_task: row.get::<_, Option<i64>>(5)?.map(TaskId),
    })
}

impl TaskStore for SqliteStore {
    fn find_tasks_by_day(&self, day: NaiveDate) -> Result<Vec<Task>, StorageError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE day = ?1 ORDER BY task_id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params![format_day(day)], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn find_latest_day_before(&self, day: NaiveDate) -> Result<Option<NaiveDate>, StorageError> {
        let latest: Option<String> = self.conn.query_row(
            "SELECT MAX(day) FROM tasks WHERE day < ?1",
            params![format_day(day)],
            |row| row.get(0),
        )?;
        latest
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, DAY_FORMAT).map_err(|_| StorageError::CorruptRow {
                    column: "day",
                    value: raw,
                })
            })
            .transpose()
    }

    fn insert_task(&self, task: &NewTask) -> Result<Task, StorageError> {
        let now = now_micros();
        self.conn.execute(
            "INSERT INTO tasks
                 (title, details, status, day, parent_task_id, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                task.title,
                task.details,
                task.status.as_str(),
                format_day(task.day),
                task.parent_task.map(TaskId::get),
                now,
            ],
        )?;
        let id = TaskId(self.conn.last_insert_rowid());
        self.find_task_by_id(id)?
            .ok_or(StorageError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> Result<(), StorageError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET status = ?1, updated_at_us = ?2 WHERE task_id = ?3",
            params![status.as_str(), now_micros(), task_id.get()],
        )?;
        if changed == 0 {
            return Err(StorageError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        Ok(())
    }

    fn find_task_by_id_and_day(
        &self,
        task_id: TaskId,
        day: NaiveDate,
    ) -> Result<Option<Task>, StorageError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1 AND day = ?2");
        let task = self
            .conn
            .query_row(&sql, params![task_id.get(), format_day(day)], row_to_task)
            .optional()?;
        Ok(task)
    }

    fn find_task_by_id(&self, task_id: TaskId) -> Result<Option<Task>, StorageError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1");
        let task = self
            .conn
            .query_row(&sql, params![task_id.get()], row_to_task)
            .optional()?;
        Ok(task)
    }

    fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StorageError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| E::from(StorageError::from(e)))?;
        // Dropping `tx` on the error path rolls back.
        let value = f(self)?;
        tx.commit().map_err(|e| E::from(StorageError::from(e)))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("in-memory store")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, d).expect("valid date")
    }

    #[test]
    fn insert_assigns_ids_and_round_trips_fields() {
        let store = store();
        let first = store
            .insert_task(&NewTask::todo("Plan sprint", Some("capacity first".into()), day(6)))
            .expect("insert");
        let second = store
            .insert_task(&NewTask::todo("Call vendor", None, day(6)))
            .expect("insert");

        assert!(second.id > first.id);
        assert_eq!(first.title, "Plan sprint");
        assert_eq!(first.details.as_deref(), Some("capacity first"));
        assert_eq!(second.details, None);
        assert_eq!(first.status, TaskStatus::Todo);
        assert_eq!(first.day, day(6));
        assert_eq!(first.parent_task, None);
    }

    #[test]
    fn empty_details_stay_distinct_from_absent() {
        let store = store();
        let task = store
            .insert_task(&NewTask::todo("Inbox zero", Some(String::new()), day(6)))
            .expect("insert");
        let loaded = store.find_task_by_id(task.id).expect("query").expect("present");
        assert_eq!(loaded.details.as_deref(), Some(""));
    }

    #[test]
    fn tasks_by_day_are_in_creation_order() {
        let store = store();
        for title in ["c", "a", "b"] {
            store.insert_task(&NewTask::todo(title, None, day(7))).expect("insert");
        }
        store.insert_task(&NewTask::todo("other day", None, day(8))).expect("insert");

        let titles: Vec<_> = store
            .find_tasks_by_day(day(7))
            .expect("query")
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn latest_day_before_skips_empty_days() {
        let store = store();
        store.insert_task(&NewTask::todo("fri", None, day(3))).expect("insert");
        store.insert_task(&NewTask::todo("mon", None, day(6))).expect("insert");

        assert_eq!(store.find_latest_day_before(day(9)).expect("query"), Some(day(6)));
        assert_eq!(store.find_latest_day_before(day(6)).expect("query"), Some(day(3)));
        assert_eq!(store.find_latest_day_before(day(3)).expect("query"), None);
    }

    #[test]
    fn update_status_of_missing_task_fails() {
        let store = store();
        assert!(store.update_task_status(TaskId(99), TaskStatus::Done).is_err());
    }

    #[test]
    fn parent_must_exist() {
        let store = store();
        let orphan = NewTask {
            parent_task: Some(TaskId(404)),
            ..NewTask::todo("orphan", None, day(9))
        };
        assert!(store.insert_task(&orphan).is_err());
    }

    #[test]
    fn failed_transaction_rolls_back_every_write() {
        let store = store();
        let source = store.insert_task(&NewTask::todo("carry me", None, day(6))).expect("insert");

        let result: Result<(), StorageError> = store.run_in_transaction(|s| {
            s.update_task_status(source.id, TaskStatus::Stashed)?;
            s.insert_task(&NewTask::successor_of(&source, day(7)))?;
            Err(StorageError::Backend("abort".into()))
        });
        assert!(result.is_err());

        let reloaded = store.find_task_by_id(source.id).expect("query").expect("present");
        assert_eq!(reloaded.status, TaskStatus::Todo);
        assert!(store.find_tasks_by_day(day(7)).expect("query").is_empty());
    }

    #[test]
    fn corrupt_status_surfaces_as_error() {
        let store = store();
        let task = store.insert_task(&NewTask::todo("x", None, day(6))).expect("insert");
        store
            .conn()
            .execute_batch("PRAGMA ignore_check_constraints = ON")
            .expect("disable checks");
        store
            .conn()
            .execute(
                "UPDATE tasks SET status = 'doing' WHERE task_id = ?1",
                params![task.id.get()],
            )
            .expect("force bad status");
        assert!(store.find_task_by_id(task.id).is_err());
    }
}
