//! Single-user task tracker backed by a JSON file.
//!
//! [`TaskRepository`] owns the file and every mutation of the task collection. The [`cli`]
//! module is a thin clap front end that translates arguments into repository calls.

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod task;

pub use clock::{Clock, SystemClock};
pub use error::TaskError;
pub use repository::{DEFAULT_TASK_FILE, TaskRepository, find_by_id};
pub use task::{Status, StatusFilter, Task};
