//! Day-level progress summary.

use super::task::{Task, TaskStatus};
use serde::Serialize;

/// Counts per status for one day's tasks.
///
/// `total` counts live work only: deleted and stashed tasks are left out, so
/// carrying a task forward or deleting it never lowers the done ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub todo: usize,
    pub blocked: usize,
    pub done: usize,
    pub deleted: usize,
    pub stashed: usize,
}

impl Progress {
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut acc, task| {
            match task.status {
                TaskStatus::Todo => acc.todo += 1,
                TaskStatus::Blocked => acc.blocked += 1,
                TaskStatus::Done => acc.done += 1,
                TaskStatus::Deleted => acc.deleted += 1,
                TaskStatus::Stashed => acc.stashed += 1,
            }
            acc
        })
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.todo + self.blocked + self.done
    }

    /// Integer percentage of live tasks that are done; 0 for an empty day.
    #[must_use]
    pub const fn done_percent(&self) -> usize {
        let total = self.total();
        if total == 0 {
            0
        } else {
            self.done * 100 / total
        }
    }

    /// Number of filled cells when drawing a bar `width` cells wide.
    #[must_use]
    pub const fn filled_cells(&self, width: usize) -> usize {
        let total = self.total();
        if total == 0 {
            0
        } else {
            self.done * width / total
        }
    }
}
