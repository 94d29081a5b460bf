//! Daily tracker: binds to one calendar day and owns the rollover.
//!
//! Binding to a day that already has tasks is read-only. Binding to an empty
//! day carries every unfinished task from the most recent earlier day that
//! has tasks: each source is stashed and a linked `todo` successor is created
//! on the new day. The whole rollover runs in one storage transaction.

use crate::error::{FocusError, ValidationError};
use crate::lifecycle::{self, UpdateOutcome};
use crate::model::{NewTask, Progress, Task, TaskId, TaskStatus};
use crate::store::TaskStore;
use chrono::NaiveDate;
use serde::Serialize;

/// One rollover pair: the stashed source id and its successor on the new day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarriedTask {
    pub from: TaskId,
    pub task: Task,
}

/// Task operations scoped to a single bound day.
#[derive(Debug)]
pub struct DailyTracker<S> {
    store: S,
    date: NaiveDate,
    new_day: bool,
    carried: Vec<CarriedTask>,
}

impl<S: TaskStore> DailyTracker<S> {
    /// Bind to `date`, rolling unfinished work forward if the day is empty.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a read fails or if the rollover cannot be
    /// committed. A failed rollover leaves storage untouched.
    pub fn from_date(store: S, date: NaiveDate) -> Result<Self, FocusError> {
        let existing = store.find_tasks_by_day(date)?;
        if !existing.is_empty() {
            tracing::debug!(%date, tasks = existing.len(), "bound to existing day");
            return Ok(Self {
                store,
                date,
                new_day: false,
                carried: Vec::new(),
            });
        }

        let carried = store
            .run_in_transaction(|s| roll_over(s, date))
            .inspect_err(|e| {
                tracing::warn!(%date, error = %e, "rollover rolled back");
            })?;

        tracing::info!(%date, carried = carried.len(), "started new day");
        Ok(Self {
            store,
            date,
            new_day: true,
            carried,
        })
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Whether this bind found the day empty and ran the rollover.
    #[must_use]
    pub const fn is_new_day(&self) -> bool {
        self.new_day
    }

    /// Pairs created by this tracker's own rollover, in prior-day order.
    #[must_use]
    pub fn carried_over(&self) -> &[CarriedTask] {
        &self.carried
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Tasks of the bound day whose status is not in `exclude`, in creation
    /// order. Empty when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn get_tasks(&self, exclude: &[TaskStatus]) -> Result<Vec<Task>, FocusError> {
        let mut tasks = self.store.find_tasks_by_day(self.date)?;
        tasks.retain(|t| !exclude.contains(&t.status));
        Ok(tasks)
    }

    /// The task with `task_id` on the bound day.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::TaskNotFound`] if the id is unknown or belongs
    /// to another day.
    pub fn get_task(&self, task_id: TaskId) -> Result<Task, FocusError> {
        self.store
            .find_task_by_id_and_day(task_id, self.date)?
            .ok_or(FocusError::TaskNotFound {
                task_id,
                day: self.date,
            })
    }

    /// Create a `todo` task on the bound day.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] for a blank title (nothing is
    /// written), or a storage error if the insert fails.
    pub fn add_task(&self, title: &str, details: Option<String>) -> Result<Task, FocusError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let task = self
            .store
            .insert_task(&NewTask::todo(title, details, self.date))?;
        tracing::debug!(task_id = %task.id, date = %self.date, "task added");
        Ok(task)
    }

    /// Apply the status state machine to `task`.
    ///
    /// # Errors
    ///
    /// See [`lifecycle::update_task`].
    pub fn update_task(
        &self,
        task: &Task,
        status: TaskStatus,
    ) -> Result<UpdateOutcome, FocusError> {
        lifecycle::update_task(&self.store, task, status)
    }

    /// Look up `task_id` on the bound day and move it to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::TaskNotFound`] when the id is not on the bound
    /// day, otherwise whatever [`Self::update_task`] returns.
    pub fn set_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<UpdateOutcome, FocusError> {
        let task = self.get_task(task_id)?;
        self.update_task(&task, status)
    }

    /// Per-status counts for the bound day.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn progress(&self) -> Result<Progress, FocusError> {
        Ok(Progress::from_tasks(&self.get_tasks(&[])?))
    }
}

fn roll_over<S: TaskStore>(store: &S, date: NaiveDate) -> Result<Vec<CarriedTask>, FocusError> {
    let Some(prior) = store.find_latest_day_before(date)? else {
        return Ok(Vec::new());
    };

    let mut carried = Vec::new();
    for source in store
        .find_tasks_by_day(prior)?
        .into_iter()
        .filter(|t| t.status.is_unfinished())
    {
        store.update_task_status(source.id, TaskStatus::Stashed)?;
        let task = store.insert_task(&NewTask::successor_of(&source, date))?;
        tracing::debug!(from = %source.id, to = %task.id, %prior, "carried task");
        carried.push(CarriedTask {
            from: source.id,
            task,
        });
    }
    Ok(carried)
}
