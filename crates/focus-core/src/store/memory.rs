//! In-memory [`TaskStore`] over an arena keyed by task id.
//!
//! Writes are counted and can be armed to fail, which makes the store useful
//! for observing exactly what the tracker persists and for exercising
//! rollback paths without a database file.

use super::TaskStore;
use crate::error::StorageError;
use crate::model::{NewTask, Task, TaskId, TaskStatus};
use chrono::{NaiveDate, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Arena {
    tasks: BTreeMap<TaskId, Task>,
    last_id: i64,
    writes: usize,
    /// Remaining writes allowed before the next one fails.
    fail_after: Option<usize>,
}

impl Arena {
    fn begin_write(&mut self, operation: &str) -> Result<(), StorageError> {
        if let Some(remaining) = self.fail_after.as_mut() {
            if *remaining == 0 {
                return Err(StorageError::Backend(format!(
                    "injected failure during {operation}"
                )));
            }
            *remaining -= 1;
        }
        self.writes += 1;
        Ok(())
    }
}

/// Single-threaded in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    arena: RefCell<Arena>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes (inserts and status updates) so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.arena.borrow().writes
    }

    /// Allow `writes` more successful writes, then fail every write after.
    pub fn fail_after_writes(&self, writes: usize) {
        self.arena.borrow_mut().fail_after = Some(writes);
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.arena.borrow_mut().fail_after = None;
    }

    /// Every stored task in id order.
    #[must_use]
    pub fn all_tasks(&self) -> Vec<Task> {
        self.arena.borrow().tasks.values().cloned().collect()
    }
}

impl TaskStore for MemoryStore {
    fn find_tasks_by_day(&self, day: NaiveDate) -> Result<Vec<Task>, StorageError> {
        Ok(self
            .arena
            .borrow()
            .tasks
            .values()
            .filter(|t| t.day == day)
            .cloned()
            .collect())
    }

    fn find_latest_day_before(&self, day: NaiveDate) -> Result<Option<NaiveDate>, StorageError> {
        Ok(self
            .arena
            .borrow()
            .tasks
            .values()
            .map(|t| t.day)
            .filter(|d| *d < day)
            .max())
    }

    fn insert_task(&self, task: &NewTask) -> Result<Task, StorageError> {
        let mut arena = self.arena.borrow_mut();
        if let Some(parent) = task.parent_task {
            if !arena.tasks.contains_key(&parent) {
                return Err(StorageError::Backend(format!(
                    "parent task {parent} does not exist"
                )));
            }
        }
        arena.begin_write("insert_task")?;
        arena.last_id += 1;
        let stored = Task {
            id: TaskId(arena.last_id),
            title: task.title.clone(),
            details: task.details.clone(),
            status: task.status,
            day: task.day,
            created_at: Utc::now(),
            parent_task: task.parent_task,
        };
        arena.tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> Result<(), StorageError> {
        let mut arena = self.arena.borrow_mut();
        if !arena.tasks.contains_key(&task_id) {
            return Err(StorageError::Backend(format!("task {task_id} does not exist")));
        }
        arena.begin_write("update_task_status")?;
        if let Some(task) = arena.tasks.get_mut(&task_id) {
            task.status = status;
        }
        Ok(())
    }

    fn find_task_by_id_and_day(
        &self,
        task_id: TaskId,
        day: NaiveDate,
    ) -> Result<Option<Task>, StorageError> {
        Ok(self
            .arena
            .borrow()
            .tasks
            .get(&task_id)
            .filter(|t| t.day == day)
            .cloned())
    }

    fn find_task_by_id(&self, task_id: TaskId) -> Result<Option<Task>, StorageError> {
        Ok(self.arena.borrow().tasks.get(&task_id).cloned())
    }

    fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StorageError>,
    {
        let snapshot = self.arena.borrow().tasks.clone();
        let result = f(self);
        if result.is_err() {
            tracing::debug!("memory store transaction rolled back");
            self.arena.borrow_mut().tasks = snapshot;
        }
        result
    }
}
