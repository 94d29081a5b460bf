//! `focus add`: create a task on the bound day.

use crate::output::{OutputMode, render_mode, task_line, task_row};
use crate::session::Session;
use clap::Args;
use focus_core::Task;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title.
    pub title: String,

    /// Longer free-form details.
    #[arg(short, long)]
    pub details: Option<String>,
}

pub fn run_add(args: &AddArgs, session: &Session) -> anyhow::Result<()> {
    let tracker = session.tracker()?;
    let task = tracker.add_task(&args.title, args.details.clone())?;
    render_added(session.output, &task)
}

fn render_added(mode: OutputMode, task: &Task) -> anyhow::Result<()> {
    render_mode(
        mode,
        task,
        |t, w| writeln!(w, "{}", task_row(t)),
        |t, w| {
            writeln!(w, "✓ Task #{} created", t.id)?;
            writeln!(w, "  {}", task_line(t))
        },
    )
}
