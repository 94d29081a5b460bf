//! `focus done|block|reset|delete`: move tasks of the bound day to a new status.
//!
//! Every id is attempted. Unknown ids and rejected changes are reported
//! individually and make the command exit non-zero once the rest have been
//! applied. Without ids, the day's tasks are listed and one id is read from
//! stdin.

use crate::output::{
    AlreadyReported, CliError, OutputMode, render_error, render_mode, status_action, status_verb,
    task_line,
};
use crate::prompt;
use crate::session::Session;
use clap::Args;
use focus_core::{FocusError, Task, TaskId, TaskStatus, UpdateOutcome};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Task ids of the bound day (a leading `#` is accepted). Prompts for
    /// one when omitted.
    pub ids: Vec<TaskId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum ResultKind {
    Updated,
    Unchanged,
    NotFound,
    Rejected,
}

#[derive(Debug, Serialize)]
struct UpdateReport {
    task_id: TaskId,
    result: ResultKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<CliError>,
}

impl UpdateReport {
    fn from_outcome(task_id: TaskId, outcome: UpdateOutcome) -> Self {
        let (result, task) = match outcome {
            UpdateOutcome::Updated(task) => (ResultKind::Updated, task),
            UpdateOutcome::Unchanged(task) => (ResultKind::Unchanged, task),
        };
        Self {
            task_id,
            result,
            task: Some(task),
            error: None,
        }
    }

    fn failed(task_id: TaskId, err: &FocusError) -> Self {
        Self {
            task_id,
            result: if err.is_not_found() {
                ResultKind::NotFound
            } else {
                ResultKind::Rejected
            },
            task: None,
            error: Some(err.into()),
        }
    }
}

pub fn run_update(
    args: &UpdateArgs,
    status: TaskStatus,
    session: &Session,
) -> anyhow::Result<()> {
    let tracker = session.tracker()?;

    let ids = if args.ids.is_empty() {
        let question = format!("Task id to {}", status_action(status));
        match prompt::pick_task_id(&tracker, &question)? {
            Some(task_id) => vec![task_id],
            None => return prompt::render_no_tasks(session.output),
        }
    } else {
        args.ids.clone()
    };

    let mut reports = Vec::with_capacity(ids.len());
    for task_id in ids {
        match tracker.set_status(task_id, status) {
            Ok(outcome) => reports.push(UpdateReport::from_outcome(task_id, outcome)),
            Err(err) if err.is_not_found() || err.is_validation() => {
                tracing::debug!(%task_id, error = %err, "update skipped task");
                reports.push(UpdateReport::failed(task_id, &err));
            }
            Err(err) => return Err(err.into()),
        }
    }

    render_updates(session.output, status, &reports)?;

    if reports.iter().any(|r| r.error.is_some()) {
        return Err(AlreadyReported.into());
    }
    Ok(())
}

fn render_updates(
    mode: OutputMode,
    status: TaskStatus,
    reports: &[UpdateReport],
) -> anyhow::Result<()> {
    if !mode.is_json() {
        for error in reports.iter().filter_map(|r| r.error.as_ref()) {
            render_error(mode, error)?;
        }
    }
    render_mode(
        mode,
        &reports,
        |rs, w| write_text(rs, w),
        |rs, w| write_pretty(rs, status, w),
    )
}

fn write_pretty(
    reports: &[UpdateReport],
    status: TaskStatus,
    w: &mut dyn Write,
) -> io::Result<()> {
    for report in reports {
        let Some(task) = &report.task else { continue };
        match report.result {
            ResultKind::Updated => {
                writeln!(w, "✓ Task #{} {}", task.id, status_verb(status))?;
            }
            ResultKind::Unchanged => {
                writeln!(w, "• Task #{} is already {}", task.id, task.status)?;
            }
            ResultKind::NotFound | ResultKind::Rejected => continue,
        }
        writeln!(w, "  {}", task_line(task))?;
    }
    Ok(())
}

fn write_text(reports: &[UpdateReport], w: &mut dyn Write) -> io::Result<()> {
    for report in reports {
        let Some(task) = &report.task else { continue };
        let label = match report.result {
            ResultKind::Updated => "updated",
            ResultKind::Unchanged => "unchanged",
            ResultKind::NotFound | ResultKind::Rejected => continue,
        };
        writeln!(w, "{}\t{label}\t{}", task.id, task.status)?;
    }
    Ok(())
}
