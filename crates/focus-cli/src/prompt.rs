//! Task id selection for commands invoked without an id.
//!
//! The bound day's tasks are listed on stderr, followed by a prompt, and the
//! answer is read from stdin. Stdout stays reserved for the command's result.

use crate::output::{CliError, OutputMode, render_mode, task_line};
use focus_core::error::ErrorCode;
use focus_core::store::TaskStore;
use focus_core::{DailyTracker, Task, TaskId};
use std::io::{self, BufRead, Write};

/// Ask for a task id of the tracker's day.
///
/// Returns `None` when the day has no tasks, so there is nothing to pick.
pub fn pick_task_id<S: TaskStore>(
    tracker: &DailyTracker<S>,
    prompt: &str,
) -> anyhow::Result<Option<TaskId>> {
    let tasks = tracker.get_tasks(&[])?;
    if tasks.is_empty() {
        return Ok(None);
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stderr = io::stderr();
    let mut out = stderr.lock();
    ask_task_id(&tasks, prompt, &mut input, &mut out).map(Some)
}

fn ask_task_id(
    tasks: &[Task],
    prompt: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> anyhow::Result<TaskId> {
    for task in tasks {
        writeln!(out, "  {}", task_line(task))?;
    }
    writeln!(out)?;
    write!(out, "{prompt}: ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(CliError::from_code(ErrorCode::MissingTaskId, "No task id given").into());
    }
    answer.parse::<TaskId>().map_err(|_| {
        CliError::from_code(
            ErrorCode::MissingTaskId,
            format!("'{answer}' is not a task id"),
        )
        .into()
    })
}

/// Report an empty day to a command that had nothing to pick from.
pub fn render_no_tasks(mode: OutputMode) -> anyhow::Result<()> {
    render_mode(
        mode,
        &Vec::<Task>::new(),
        |_, w| writeln!(w, "No tasks for today..."),
        |_, w| writeln!(w, "No tasks for today..."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use focus_core::TaskStatus;
    use std::io::Cursor;

    fn tasks() -> Vec<Task> {
        let day = NaiveDate::from_ymd_opt(2024, 1, 8).expect("valid date");
        ["Draft RFC", "Pay invoice"]
            .iter()
            .zip(1..)
            .map(|(title, id)| Task {
                id: TaskId(id),
                title: (*title).to_string(),
                details: None,
                status: TaskStatus::Todo,
                day,
                created_at: Utc::now(),
                parent_task: None,
            })
            .collect()
    }

    fn ask(answer: &str) -> (anyhow::Result<TaskId>, String) {
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = ask_task_id(&tasks(), "Task id to mark done", &mut input, &mut out);
        (result, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn lists_tasks_then_reads_id() {
        let (result, shown) = ask("#2\n");
        assert_eq!(result.expect("id"), TaskId(2));
        assert!(shown.contains("#1    ⬢ todo     Draft RFC"));
        assert!(shown.contains("#2    ⬢ todo     Pay invoice"));
        assert!(shown.ends_with("Task id to mark done: "));
    }

    #[test]
    fn empty_answer_is_missing_id() {
        let (result, _) = ask("");
        let err = result.expect_err("no answer");
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2006"));
        assert_eq!(cli.message, "No task id given");
    }

    #[test]
    fn garbage_answer_is_rejected() {
        let (result, _) = ask("soon\n");
        let cli = CliError::from_anyhow(&result.expect_err("not an id"));
        assert_eq!(cli.message, "'soon' is not a task id");
    }
}
