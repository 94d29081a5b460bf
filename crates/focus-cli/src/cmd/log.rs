//! `focus log`: the lineage of one task, grouped by day, oldest first.

use crate::output::{OutputMode, pretty_date, render_mode, task_line};
use crate::session::Session;
use clap::Args;
use focus_core::{DayGroup, TaskId, history};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Task id of the bound day.
    pub id: TaskId,
}

pub fn run_log(args: &LogArgs, session: &Session) -> anyhow::Result<()> {
    let tracker = session.tracker()?;
    let task = tracker.get_task(args.id)?;
    let groups = history(tracker.store(), &task).by_day()?;
    render_log(session.output, &groups)
}

fn render_log(mode: OutputMode, groups: &[DayGroup]) -> anyhow::Result<()> {
    render_mode(
        mode,
        &groups,
        |g, w| write_history_text(g, w),
        |g, w| write_history_pretty(g, w),
    )
}

/// Day headers with their tasks indented beneath.
pub fn write_history_pretty(groups: &[DayGroup], w: &mut dyn Write) -> io::Result<()> {
    for group in groups {
        writeln!(w, "{}", pretty_date(group.day))?;
        for task in &group.tasks {
            writeln!(w, "  {}", task_line(task))?;
        }
    }
    Ok(())
}

/// One `day<TAB>id<TAB>status<TAB>title` row per task.
pub fn write_history_text(groups: &[DayGroup], w: &mut dyn Write) -> io::Result<()> {
    for group in groups {
        for task in &group.tasks {
            writeln!(w, "{}\t{}\t{}\t{}", group.day, task.id, task.status, task.title)?;
        }
    }
    Ok(())
}
