//! focus-core library.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in [`error`]; `anyhow::Result` only
//!   where a file or database is opened.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Storage**: every read and write goes through [`store::TaskStore`].

pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod model;
pub mod store;
pub mod tracker;

pub use error::{ErrorCode, FocusError, StorageError, ValidationError};
pub use history::{DayGroup, History, HistoryItem, history};
pub use lifecycle::UpdateOutcome;
pub use model::{Progress, Task, TaskId, TaskStatus};
pub use tracker::{CarriedTask, DailyTracker};
