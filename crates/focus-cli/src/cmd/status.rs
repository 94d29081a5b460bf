//! `focus status`: bind to the day and show its tasks and progress.

use crate::output::{
    OutputMode, pretty_date, pretty_rule, progress_bar, render_mode, task_line, task_row,
};
use crate::session::Session;
use chrono::NaiveDate;
use clap::Args;
use focus_core::{CarriedTask, Progress, Task, TaskStatus};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Include deleted tasks.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    date: NaiveDate,
    new_day: bool,
    carried: Vec<CarriedTask>,
    tasks: Vec<Task>,
    progress: Progress,
    done_percent: usize,
}

pub fn run_status(args: &StatusArgs, session: &Session) -> anyhow::Result<()> {
    let tracker = session.tracker()?;
    let exclude: &[TaskStatus] = if args.all { &[] } else { &[TaskStatus::Deleted] };
    let tasks = tracker.get_tasks(exclude)?;
    let progress = tracker.progress()?;

    let report = StatusReport {
        date: tracker.date(),
        new_day: tracker.is_new_day(),
        carried: tracker.carried_over().to_vec(),
        tasks,
        progress,
        done_percent: progress.done_percent(),
    };

    render_status(session.output, &report)
}

fn render_status(mode: OutputMode, report: &StatusReport) -> anyhow::Result<()> {
    render_mode(mode, report, render_status_text, render_status_pretty)
}

fn render_status_pretty(report: &StatusReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", pretty_date(report.date))?;
    pretty_rule(w)?;

    if report.new_day {
        if report.carried.is_empty() {
            writeln!(w, "✨ A new day starts, good luck!")?;
        } else {
            writeln!(
                w,
                "✨ A new day starts, {} unfinished task(s) carried over:",
                report.carried.len()
            )?;
            for carried in &report.carried {
                writeln!(w, "  Task #{} → #{}", carried.from, carried.task.id)?;
            }
        }
        writeln!(w)?;
    }

    if report.tasks.is_empty() {
        writeln!(w, "No tasks for today...")?;
        return Ok(());
    }

    for task in &report.tasks {
        writeln!(w, "  {}", task_line(task))?;
    }
    writeln!(w)?;
    writeln!(w, "{}", progress_bar(&report.progress))
}

fn render_status_text(report: &StatusReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "date\t{}", report.date)?;
    for carried in &report.carried {
        writeln!(w, "carried\t{}\t{}", carried.from, carried.task.id)?;
    }
    if report.tasks.is_empty() {
        writeln!(w, "No tasks for today...")?;
        return Ok(());
    }
    for task in &report.tasks {
        writeln!(w, "{}", task_row(task))?;
    }
    writeln!(
        w,
        "progress\t{}/{}\t{}%",
        report.progress.done,
        report.progress.total(),
        report.done_percent
    )
}
