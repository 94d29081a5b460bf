//! Storage seam consumed by the tracker and the history walker.
//!
//! Two implementations ship with the crate:
//! - [`SqliteStore`](crate::db::store::SqliteStore), the durable store used by the CLI
//! - [`MemoryStore`], an arena keyed by id with write counting and fault injection
//!
//! A shared reference to a store is itself a store, so a tracker can borrow
//! storage that the caller keeps using afterwards.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::StorageError;
use crate::model::{NewTask, Task, TaskId, TaskStatus};
use chrono::NaiveDate;

/// Record-level access to persisted tasks.
///
/// All methods take `&self`; backends with interior state synchronize it
/// themselves. Collections come back in creation order.
pub trait TaskStore {
    /// Every task whose `day` equals `day`, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn find_tasks_by_day(&self, day: NaiveDate) -> Result<Vec<Task>, StorageError>;

    /// The most recent day strictly before `day` holding at least one task.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn find_latest_day_before(&self, day: NaiveDate) -> Result<Option<NaiveDate>, StorageError>;

    /// Persist a new task and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    fn insert_task(&self, task: &NewTask) -> Result<Task, StorageError>;

    /// Overwrite the status of an existing task.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> Result<(), StorageError>;

    /// The task with `task_id`, only if it belongs to `day`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn find_task_by_id_and_day(
        &self,
        task_id: TaskId,
        day: NaiveDate,
    ) -> Result<Option<Task>, StorageError>;

    /// The task with `task_id` on any day. Used to resolve lineage links.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn find_task_by_id(&self, task_id: TaskId) -> Result<Option<Task>, StorageError>;

    /// Run `f` as one atomic unit: every write inside commits together, or
    /// none does when `f` returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a storage error if the transaction
    /// cannot be opened or committed.
    fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StorageError>;
}

impl<T: TaskStore> TaskStore for &T {
    fn find_tasks_by_day(&self, day: NaiveDate) -> Result<Vec<Task>, StorageError> {
        (**self).find_tasks_by_day(day)
    }

    fn find_latest_day_before(&self, day: NaiveDate) -> Result<Option<NaiveDate>, StorageError> {
        (**self).find_latest_day_before(day)
    }

    fn insert_task(&self, task: &NewTask) -> Result<Task, StorageError> {
        (**self).insert_task(task)
    }

    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> Result<(), StorageError> {
        (**self).update_task_status(task_id, status)
    }

    fn find_task_by_id_and_day(
        &self,
        task_id: TaskId,
        day: NaiveDate,
    ) -> Result<Option<Task>, StorageError> {
        (**self).find_task_by_id_and_day(task_id, day)
    }

    fn find_task_by_id(&self, task_id: TaskId) -> Result<Option<Task>, StorageError> {
        (**self).find_task_by_id(task_id)
    }

    fn run_in_transaction<U, E, F>(&self, f: F) -> Result<U, E>
    where
        F: FnOnce(&Self) -> Result<U, E>,
        E: From<StorageError>,
    {
        (**self).run_in_transaction(|_| f(self))
    }
}
