//! Shared output layer for pretty/text/JSON parity across all commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: framed output for humans, compact rows for pipes and
//! scripts, or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `FORMAT` env var
//! 3. `output` in the user config
//! 4. [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::ValueEnum;
use focus_core::error::{ErrorCode, FocusError};
use focus_core::{Progress, Task, TaskStatus};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 48;

/// Number of cells in the progress bar.
pub const PROGRESS_BAR_WIDTH: usize = 30;

const TASK_ICON: &str = "⬢";

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, icons, progress bar).
    Pretty,
    /// Plain rows for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    /// Map a canonical mode name back to the enum; unknown names are text.
    pub fn from_name(name: &str) -> Self {
        match name {
            "pretty" => Self::Pretty,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Error carrying the hint and code of `code`.
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    /// Classify an arbitrary error chain for display.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(cli) = err.downcast_ref::<Self>() {
            return cli.clone();
        }
        if let Some(focus) = err.downcast_ref::<FocusError>() {
            return focus.into();
        }
        let storage = err
            .chain()
            .any(|cause| cause.is::<rusqlite::Error>() || cause.is::<io::Error>());
        let code = if storage {
            ErrorCode::StorageFailure
        } else {
            ErrorCode::InternalUnexpected
        };
        Self::from_code(code, format!("{err:#}"))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<&FocusError> for CliError {
    fn from(err: &FocusError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: Some(err.suggestion()),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

/// Marker for a failure whose details were already written to stderr.
#[derive(Debug)]
pub struct AlreadyReported;

impl fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("one or more operations failed")
    }
}

impl std::error::Error for AlreadyReported {}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)?;
    Ok(())
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Long human date, e.g. `Sat, 14 January 2012`.
pub fn pretty_date(day: NaiveDate) -> String {
    day.format("%a, %d %B %Y").to_string()
}

/// Creation time in local time, minute precision.
pub fn local_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// One-line task summary: `#4  ⬢ todo     Draft RFC`.
pub fn task_line(task: &Task) -> String {
    format!(
        "#{:<4} {TASK_ICON} {:<8} {}",
        task.id.get(),
        task.status.as_str(),
        task.title
    )
}

/// Tab-separated task row for text mode.
pub fn task_row(task: &Task) -> String {
    format!("{}\t{}\t{}", task.id, task.status, task.title)
}

/// Progress bar: `50% [###############...............]`.
pub fn progress_bar(progress: &Progress) -> String {
    let filled = progress.filled_cells(PROGRESS_BAR_WIDTH);
    format!(
        "{}% [{}{}]",
        progress.done_percent(),
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// Imperative used when asking which task to change.
pub const fn status_action(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "reset",
        TaskStatus::Done => "mark done",
        TaskStatus::Blocked => "block",
        TaskStatus::Deleted => "delete",
        TaskStatus::Stashed => "stash",
    }
}

/// Verb shown after a successful status change.
pub const fn status_verb(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "reset to todo",
        TaskStatus::Done => "marked done",
        TaskStatus::Blocked => "marked blocked",
        TaskStatus::Deleted => "deleted",
        TaskStatus::Stashed => "stashed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_core::TaskId;

    fn task(id: i64, status: TaskStatus) -> Task {
        Task {
            id: TaskId(id),
            title: "Test".to_string(),
            details: None,
            status,
            day: NaiveDate::from_ymd_opt(2012, 1, 14).expect("valid date"),
            created_at: Utc::now(),
            parent_task: None,
        }
    }

    #[test]
    fn pretty_date_is_long_form() {
        let day = NaiveDate::from_ymd_opt(2012, 1, 14).expect("valid date");
        assert_eq!(pretty_date(day), "Sat, 14 January 2012");
    }

    #[test]
    fn task_line_shows_id_icon_status_title() {
        assert_eq!(task_line(&task(1, TaskStatus::Todo)), "#1    ⬢ todo     Test");
        assert_eq!(task_row(&task(12, TaskStatus::Blocked)), "12\tblocked\tTest");
    }

    #[test]
    fn progress_bar_half_done() {
        let tasks = [task(1, TaskStatus::Todo), task(2, TaskStatus::Done)];
        let bar = progress_bar(&Progress::from_tasks(&tasks));
        assert_eq!(bar, format!("50% [{}{}]", "#".repeat(15), ".".repeat(15)));
    }

    #[test]
    fn progress_bar_one_third_done() {
        let tasks = [
            task(1, TaskStatus::Todo),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::Done),
        ];
        let bar = progress_bar(&Progress::from_tasks(&tasks));
        assert_eq!(bar, format!("33% [{}{}]", "#".repeat(10), ".".repeat(20)));
    }

    #[test]
    fn progress_bar_empty_day() {
        assert_eq!(
            progress_bar(&Progress::default()),
            format!("0% [{}]", ".".repeat(30))
        );
    }

    #[test]
    fn output_mode_names_round_trip() {
        for mode in [OutputMode::Pretty, OutputMode::Text, OutputMode::Json] {
            assert_eq!(OutputMode::from_name(mode.as_str()), mode);
        }
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Text.is_json());
    }

    #[test]
    fn cli_error_from_focus_error_carries_code() {
        let err = FocusError::TaskNotFound {
            task_id: TaskId(9),
            day: NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"),
        };
        let cli = CliError::from(&err);
        assert_eq!(cli.message, "Task 9 does not exist on 2024-01-02");
        assert_eq!(cli.error_code.as_deref(), Some("E2001"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn from_anyhow_unwraps_known_errors() {
        let wrapped = anyhow::Error::new(CliError::from_code(ErrorCode::NotInitialized, "nope"));
        assert_eq!(CliError::from_anyhow(&wrapped).error_code.as_deref(), Some("E1001"));

        let io = anyhow::Error::new(io::Error::other("disk")).context("open db");
        assert_eq!(CliError::from_anyhow(&io).error_code.as_deref(), Some("E5001"));

        let other = anyhow::anyhow!("boom");
        assert_eq!(CliError::from_anyhow(&other).error_code.as_deref(), Some("E9001"));
    }

    #[test]
    fn error_json_is_wrapped() {
        let mut buf = Vec::new();
        write_error(
            OutputMode::Json,
            &CliError::from_code(ErrorCode::EmptyTitle, "task title must not be empty"),
            &mut buf,
        )
        .expect("write");
        let json: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(json["error"]["error_code"], "E2002");
    }

    #[test]
    fn error_text_has_suggestion_line() {
        let mut buf = Vec::new();
        write_error(
            OutputMode::Text,
            &CliError::from_code(ErrorCode::TaskNotFound, "Task 3 does not exist on 2024-01-02"),
            &mut buf,
        )
        .expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("error: Task 3 does not exist"));
        assert!(text.contains("  suggestion: "));
    }
}
