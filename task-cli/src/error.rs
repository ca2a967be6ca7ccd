use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the task store and its inputs.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("That is not a valid status. Status must be todo, in-progress, or done.")]
    InvalidStatus(String),
    #[error("No task found with ID {0}")]
    NotFound(u32),
    #[error("Tasks file {} is empty or corrupted", path.display())]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Cannot access tasks file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No task ids left to allocate")]
    IdsExhausted,
    #[error("Failed to serialize tasks")]
    Serialize(#[from] serde_json::Error),
}

impl TaskError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TaskError::Io {
            path: path.into(),
            source,
        }
    }
}
