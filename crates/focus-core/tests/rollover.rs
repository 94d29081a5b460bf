//! Rollover and lineage against a real SQLite file.
//!
//! Each test opens a fresh database inside its own temp directory and
//! reopens it where persistence across processes matters.

use chrono::NaiveDate;
use focus_core::db::SqliteStore;
use focus_core::history::{HistoryItem, history};
use focus_core::model::{NewTask, TaskStatus};
use focus_core::store::TaskStore;
use focus_core::{DailyTracker, FocusError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn temp_db() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("focus.sqlite3");
    (dir, path)
}

fn open(path: &Path) -> SqliteStore {
    SqliteStore::open(path).expect("open store")
}

#[test]
fn rollover_survives_reopen_and_is_idempotent() {
    let (_dir, path) = temp_db();
    let friday = day(2024, 1, 5);
    let monday = day(2024, 1, 8);

    {
        let tracker = DailyTracker::from_date(open(&path), friday).expect("bind friday");
        let a = tracker.add_task("Draft RFC", Some("sections 1-3".into())).expect("add");
        let b = tracker.add_task("Pay invoice", None).expect("add");
        tracker.add_task("Fix flaky test", None).expect("add");
        tracker.set_status(b.id, TaskStatus::Done).expect("done");
        tracker.set_status(a.id, TaskStatus::Blocked).expect("block");
    }

    let first = DailyTracker::from_date(open(&path), monday).expect("bind monday");
    assert!(first.is_new_day());
    let carried = first.get_tasks(&[]).expect("tasks");
    let titles: Vec<_> = carried.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Draft RFC", "Fix flaky test"]);
    assert_eq!(carried[0].details.as_deref(), Some("sections 1-3"));
    assert!(carried.iter().all(|t| t.status == TaskStatus::Todo));
    drop(first);

    let second = DailyTracker::from_date(open(&path), monday).expect("rebind monday");
    assert!(!second.is_new_day());
    assert_eq!(second.get_tasks(&[]).expect("tasks"), carried);

    let friday_tasks = second.store().find_tasks_by_day(friday).expect("friday");
    let statuses: Vec<_> = friday_tasks.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        [TaskStatus::Stashed, TaskStatus::Done, TaskStatus::Stashed]
    );
}

#[test]
fn ids_are_never_reused_across_rollovers() {
    let (_dir, path) = temp_db();
    let store = open(&path);
    let mut seen = std::collections::HashSet::new();

    let first = DailyTracker::from_date(&store, day(2024, 2, 1)).expect("bind");
    seen.insert(first.add_task("one", None).expect("add").id);
    for d in 2..=5 {
        let tracker = DailyTracker::from_date(&store, day(2024, 2, d)).expect("bind");
        for task in tracker.get_tasks(&[]).expect("tasks") {
            assert!(seen.insert(task.id), "id {} reused", task.id);
        }
    }
    assert_eq!(seen.len(), 5);
}

#[test]
fn history_walks_back_through_persisted_days() {
    let (_dir, path) = temp_db();
    let store = open(&path);
    let days = [day(2024, 4, 1), day(2024, 4, 2), day(2024, 4, 4)];

    DailyTracker::from_date(&store, days[0])
        .expect("bind")
        .add_task("Renew passport", None)
        .expect("add");
    for d in &days[1..] {
        DailyTracker::from_date(&store, *d).expect("bind");
    }

    let today = DailyTracker::from_date(&store, days[2]).expect("bind");
    let tip = today.get_tasks(&[]).expect("tasks").remove(0);
    let items: Vec<_> = history(&store, &tip)
        .collect::<Result<_, FocusError>>()
        .expect("history");

    let markers: Vec<_> = items
        .iter()
        .filter_map(|i| match i {
            HistoryItem::DayMarker(d) => Some(*d),
            HistoryItem::TaskEntry(_) => None,
        })
        .collect();
    assert_eq!(markers, days);
    assert_eq!(items.len(), 6);
    assert_eq!(items.last(), Some(&HistoryItem::TaskEntry(tip)));
}

#[test]
fn set_status_cannot_stash() {
    let (_dir, path) = temp_db();
    let tracker = DailyTracker::from_date(open(&path), day(2024, 5, 1)).expect("bind");
    let task = tracker.add_task("Keep me", None).expect("add");

    let err = tracker
        .set_status(task.id, TaskStatus::Stashed)
        .expect_err("reserved");
    assert_eq!(err.code().code(), "E2003");
    assert_eq!(tracker.get_task(task.id).expect("task").status, TaskStatus::Todo);
}

#[test]
fn deleted_tasks_stay_on_their_day() {
    let (_dir, path) = temp_db();
    let store = open(&path);
    let d0 = day(2024, 7, 1);
    let tracker = DailyTracker::from_date(&store, d0).expect("bind");
    let gone = tracker.add_task("Obsolete", None).expect("add");
    tracker.set_status(gone.id, TaskStatus::Deleted).expect("delete");

    let next = DailyTracker::from_date(&store, day(2024, 7, 2)).expect("bind");
    assert!(next.get_tasks(&[]).expect("tasks").is_empty());

    let kept = store
        .find_task_by_id_and_day(gone.id, d0)
        .expect("query")
        .expect("never physically deleted");
    assert_eq!(kept.status, TaskStatus::Deleted);
}

#[test]
fn rollover_into_the_past_uses_only_earlier_days() {
    let (_dir, path) = temp_db();
    let store = open(&path);
    store
        .insert_task(&NewTask::todo("future", None, day(2024, 9, 10)))
        .expect("insert");

    let past = DailyTracker::from_date(&store, day(2024, 9, 1)).expect("bind");
    assert!(past.is_new_day());
    assert!(past.carried_over().is_empty());
}
