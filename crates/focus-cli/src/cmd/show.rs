//! `focus show`: one task of the bound day with its details and history.

use super::log::{write_history_pretty, write_history_text};
use crate::output::{
    CliError, OutputMode, local_timestamp, pretty_date, pretty_kv, pretty_rule, pretty_section,
    render_mode, task_line,
};
use crate::prompt;
use crate::session::Session;
use clap::Args;
use focus_core::error::ErrorCode;
use focus_core::{DayGroup, Task, TaskId, history};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task id of the bound day. Prompts for one when omitted.
    pub id: Option<TaskId>,

    /// Print only the raw details text, e.g. to pipe into a clipboard tool.
    #[arg(long)]
    pub details: bool,
}

#[derive(Debug, Serialize)]
struct ShowTask {
    task: Task,
    history: Vec<DayGroup>,
}

pub fn run_show(args: &ShowArgs, session: &Session) -> anyhow::Result<()> {
    let tracker = session.tracker()?;
    let task_id = match args.id {
        Some(task_id) => task_id,
        None => match prompt::pick_task_id(&tracker, "Task id to show")? {
            Some(task_id) => task_id,
            None => return prompt::render_no_tasks(session.output),
        },
    };
    let task = tracker.get_task(task_id)?;

    if args.details {
        let Some(details) = task.details() else {
            return Err(CliError::from_code(
                ErrorCode::MissingDetails,
                format!("Task {} does not have details.", task.id),
            )
            .into());
        };
        let mut out = io::stdout().lock();
        writeln!(out, "{details}")?;
        return Ok(());
    }

    let history = history(tracker.store(), &task).by_day()?;
    render_show(session.output, &ShowTask { task, history })
}

fn render_show(mode: OutputMode, item: &ShowTask) -> anyhow::Result<()> {
    render_mode(mode, item, render_show_text, render_show_pretty)
}

fn render_show_pretty(item: &ShowTask, w: &mut dyn Write) -> io::Result<()> {
    let task = &item.task;
    pretty_section(w, &format!("Task: {}", task_line(task)))?;
    pretty_kv(w, "status", task.status.as_str())?;
    pretty_kv(w, "day", pretty_date(task.day))?;
    pretty_kv(w, "created", local_timestamp(task.created_at))?;
    if let Some(parent) = task.parent_task {
        pretty_kv(w, "carried from", format!("#{parent}"))?;
    }
    writeln!(w)?;
    writeln!(w, "{}", task.details().unwrap_or("No details provided ..."))?;

    if item.history.len() > 1 {
        writeln!(w)?;
        pretty_section(w, "History")?;
        write_history_pretty(&item.history, w)?;
    }
    pretty_rule(w)
}

fn render_show_text(item: &ShowTask, w: &mut dyn Write) -> io::Result<()> {
    let task = &item.task;
    writeln!(w, "id\t{}", task.id)?;
    writeln!(w, "title\t{}", task.title)?;
    writeln!(w, "status\t{}", task.status)?;
    writeln!(w, "day\t{}", task.day)?;
    if let Some(parent) = task.parent_task {
        writeln!(w, "parent\t{parent}")?;
    }
    if let Some(details) = task.details() {
        writeln!(w, "details\t{}", details.replace('\n', "\\n"))?;
    }
    write_history_text(&item.history, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use clap::Parser;
    use focus_core::TaskStatus;

    fn show_item(details: Option<&str>) -> ShowTask {
        let day = NaiveDate::from_ymd_opt(2024, 1, 8).expect("valid date");
        let task = Task {
            id: TaskId(4),
            title: "Draft RFC".to_string(),
            details: details.map(str::to_string),
            status: TaskStatus::Todo,
            day,
            created_at: Utc::now(),
            parent_task: Some(TaskId(1)),
        };
        ShowTask {
            history: vec![DayGroup {
                day,
                tasks: vec![task.clone()],
            }],
            task,
        }
    }

    fn pretty(item: &ShowTask) -> String {
        let mut buf = Vec::new();
        render_show_pretty(item, &mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn show_args_parse_details_flag() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ShowArgs,
        }
        let w = Wrapper::parse_from(["test", "#4", "--details"]);
        assert_eq!(w.args.id, Some(TaskId(4)));
        assert!(w.args.details);
        assert_eq!(Wrapper::parse_from(["test"]).args.id, None);
    }

    #[test]
    fn pretty_includes_fields_and_details() {
        let out = pretty(&show_item(Some("sections 1-3")));
        assert!(out.starts_with("Task: #4"));
        assert!(out.contains("carried from:  #1"));
        assert!(out.contains("sections 1-3"));
        assert!(!out.contains("History"));
    }

    #[test]
    fn pretty_without_details_says_so() {
        let out = pretty(&show_item(None));
        assert!(out.contains("No details provided ..."));
    }

    #[test]
    fn text_escapes_multiline_details() {
        let mut buf = Vec::new();
        render_show_text(&show_item(Some("a\nb")), &mut buf).expect("render");
        let out = String::from_utf8(buf).expect("utf8");
        assert!(out.contains("details\ta\\nb\n"));
        assert!(out.contains("parent\t1\n"));
    }
}
