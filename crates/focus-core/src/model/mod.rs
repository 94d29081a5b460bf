//! Task data model.

pub mod progress;
pub mod task;

pub use progress::Progress;
pub use task::{NewTask, ParseStatusError, Task, TaskId, TaskStatus};
