//! Task status state machine.
//!
//! Any user-assignable status may move to any other. `stashed` can never be
//! requested, a stashed task never changes again, and asking for the status a
//! task already has writes nothing.

use crate::error::{FocusError, ValidationError};
use crate::model::{Task, TaskStatus};
use crate::store::TaskStore;
use serde::Serialize;

/// What an update will do, decided before touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write `to` over `from`.
    Apply { from: TaskStatus, to: TaskStatus },
    /// Target equals current status.
    NoOp,
}

/// Result of a status update that reached a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "task", rename_all = "lowercase")]
pub enum UpdateOutcome {
    /// Status was written; carries the task as it is now.
    Updated(Task),
    /// Status already matched; nothing was written.
    Unchanged(Task),
}

impl UpdateOutcome {
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::Updated(task) | Self::Unchanged(task) => task,
        }
    }

    #[must_use]
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Validate `target` against `current` and classify the transition.
///
/// # Errors
///
/// Returns [`ValidationError::ReservedStatus`] when `target` is `stashed`,
/// and [`ValidationError::StashedIsFinal`] when `current` is.
pub const fn plan_transition(
    current: TaskStatus,
    target: TaskStatus,
) -> Result<Transition, ValidationError> {
    if !target.is_user_assignable() {
        return Err(ValidationError::ReservedStatus(target));
    }
    if matches!(current, TaskStatus::Stashed) {
        return Err(ValidationError::StashedIsFinal);
    }
    if current as u8 == target as u8 {
        Ok(Transition::NoOp)
    } else {
        Ok(Transition::Apply {
            from: current,
            to: target,
        })
    }
}

/// Move `task` to `status`, persisting through `store` unless it is a no-op.
///
/// # Errors
///
/// Returns a validation error for a reserved target or a stashed task, or the
/// storage error if the write fails.
pub fn update_task<S: TaskStore>(
    store: &S,
    task: &Task,
    status: TaskStatus,
) -> Result<UpdateOutcome, FocusError> {
    match plan_transition(task.status, status)? {
        Transition::NoOp => {
            tracing::debug!(task_id = %task.id, %status, "status unchanged");
            Ok(UpdateOutcome::Unchanged(task.clone()))
        }
        Transition::Apply { from, to } => {
            store.update_task_status(task.id, to)?;
            tracing::debug!(task_id = %task.id, %from, %to, "status updated");
            Ok(UpdateOutcome::Updated(Task {
                status: to,
                ..task.clone()
            }))
        }
    }
}
