//! Lineage history: a task and every ancestor reachable through
//! `parent_task`, oldest first, grouped under day markers.

use crate::error::FocusError;
use crate::model::{Task, TaskId};
use crate::store::TaskStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::vec;

/// One element of a history walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HistoryItem {
    /// Start of a day; every following entry up to the next marker belongs to it.
    DayMarker(NaiveDate),
    TaskEntry(Task),
}

/// All entries of one day, as produced by [`History::by_day`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Deferred walk over a task's lineage.
///
/// Building a walk reads nothing. The first call to `next` resolves the whole
/// ancestor chain in one pass, since the oldest ancestor is yielded first;
/// later calls only step through that snapshot. Every call to [`history`]
/// starts an independent walk; the walk never writes.
#[derive(Debug)]
pub struct History<'a, S> {
    store: &'a S,
    state: State,
}

#[derive(Debug)]
enum State {
    Pending(Task),
    Walking {
        chain: vec::IntoIter<Task>,
        next_task: Option<Task>,
        current_day: Option<NaiveDate>,
    },
    Done,
}

/// Start a lineage walk ending at `task`.
#[must_use]
pub fn history<'a, S: TaskStore>(store: &'a S, task: &Task) -> History<'a, S> {
    History {
        store,
        state: State::Pending(task.clone()),
    }
}

impl<S: TaskStore> History<'_, S> {
    /// Drain the walk into per-day groups, oldest day first.
    ///
    /// # Errors
    ///
    /// Returns the first error the walk hits.
    pub fn by_day(self) -> Result<Vec<DayGroup>, FocusError> {
        let mut groups: Vec<DayGroup> = Vec::new();
        for item in self {
            match item? {
                HistoryItem::DayMarker(day) => groups.push(DayGroup {
                    day,
                    tasks: Vec::new(),
                }),
                HistoryItem::TaskEntry(task) => {
                    if let Some(group) = groups.last_mut() {
                        group.tasks.push(task);
                    }
                }
            }
        }
        Ok(groups)
    }
}

/// Resolve the ancestor chain of `tip`, returned oldest first.
///
/// Each parent must exist and sit on a strictly earlier day than its child,
/// and no id may repeat.
fn load_chain<S: TaskStore>(store: &S, tip: Task) -> Result<Vec<Task>, FocusError> {
    let mut seen = HashSet::from([tip.id]);
    let mut chain = vec![tip];

    while let Some((child_id, child_day, parent_id)) = chain
        .last()
        .and_then(|t| t.parent_task.map(|p| (t.id, t.day, p)))
    {
        let corrupt = || FocusError::CorruptLineage { task_id: child_id };
        let parent = store.find_task_by_id(parent_id)?.ok_or_else(corrupt)?;
        if parent.day >= child_day || !seen.insert(parent.id) {
            tracing::warn!(task_id = %child_id, parent = %parent_id, "corrupt lineage link");
            return Err(corrupt());
        }
        chain.push(parent);
    }

    chain.reverse();
    tracing::trace!(len = chain.len(), "lineage resolved");
    Ok(chain)
}

impl<S: TaskStore> Iterator for History<'_, S> {
    type Item = Result<HistoryItem, FocusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Done => return None,
                State::Pending(tip) => match load_chain(self.store, tip) {
                    Ok(chain) => {
                        let mut chain = chain.into_iter();
                        self.state = State::Walking {
                            next_task: chain.next(),
                            chain,
                            current_day: None,
                        };
                    }
                    Err(e) => return Some(Err(e)),
                },
                State::Walking {
                    mut chain,
                    next_task,
                    current_day,
                } => {
                    let task = next_task?;
                    if current_day == Some(task.day) {
                        self.state = State::Walking {
                            next_task: chain.next(),
                            chain,
                            current_day,
                        };
                        return Some(Ok(HistoryItem::TaskEntry(task)));
                    }
                    let day = task.day;
                    self.state = State::Walking {
                        chain,
                        next_task: Some(task),
                        current_day: Some(day),
                    };
                    return Some(Ok(HistoryItem::DayMarker(day)));
                }
            }
        }
    }
}

impl<S: TaskStore> std::iter::FusedIterator for History<'_, S> {}

/// Ids along the lineage of `task`, oldest first.
///
/// # Errors
///
/// Same failure modes as the walk itself.
pub fn lineage_ids<S: TaskStore>(store: &S, task: &Task) -> Result<Vec<TaskId>, FocusError> {
    history(store, task)
        .filter_map(|item| match item {
            Ok(HistoryItem::TaskEntry(t)) => Some(Ok(t.id)),
            Ok(HistoryItem::DayMarker(_)) => None,
            Err(e) => Some(Err(e)),
        })
        .collect()
}
