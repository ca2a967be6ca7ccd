use crate::clock::{Clock, SystemClock};
use crate::error::TaskError;
use crate::task::{Status, StatusFilter, Task};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File name used when nothing else is configured.
pub const DEFAULT_TASK_FILE: &str = "tasks_list.json";

/// Owns the JSON file holding the task collection.
///
/// Every operation is a fresh load, optional mutation, and whole-file rewrite. Nothing is cached
/// between calls. Concurrent processes writing the same file race and the last save wins.
#[derive(Debug, Clone)]
pub struct TaskRepository<C: Clock = SystemClock> {
    path: PathBuf,
    clock: C,
}

impl TaskRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, SystemClock)
    }
}

impl<C: Clock> TaskRepository<C> {
    pub fn with_clock(path: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole collection.
    ///
    /// A missing file and a file that does not parse both yield an empty collection. Only I/O
    /// failures other than "not found" are returned as errors.
    pub fn load(&self) -> Result<Vec<Task>, TaskError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No tasks file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(TaskError::io(&self.path, err)),
        };

        match self.parse(&contents) {
            Ok(tasks) => {
                debug!("Loaded {} tasks from {}", tasks.len(), self.path.display());
                Ok(tasks)
            }
            Err(err) => {
                warn!("{}, treating it as empty", err);
                Ok(Vec::new())
            }
        }
    }

    /// Appends a new task and returns its id.
    ///
    /// The id is one past the largest id present. Gaps left by deletions are never filled.
    pub fn create(&self, description: impl Into<String>, status: Status) -> Result<u32, TaskError> {
        let mut tasks = self.load()?;
        let id = next_id(&tasks)?;
        tasks.push(Task::new(id, description.into(), status, self.clock.now()));
        self.save(&tasks)?;
        info!("Created task {}", id);
        Ok(id)
    }

    pub fn update_description(
        &self,
        id: u32,
        description: impl Into<String>,
    ) -> Result<(), TaskError> {
        let description = description.into();
        self.modify(id, |task, now| task.set_description(description, now))?;
        info!("Updated description of task {}", id);
        Ok(())
    }

    pub fn update_status(&self, id: u32, status: Status) -> Result<(), TaskError> {
        self.modify(id, |task, now| task.set_status(status, now))?;
        info!("Updated status of task {} to {}", id, status);
        Ok(())
    }

    pub fn delete(&self, id: u32) -> Result<(), TaskError> {
        let tasks = self.load()?;
        let before = tasks.len();
        let remaining: Vec<Task> = tasks.into_iter().filter(|task| task.id() != id).collect();
        if remaining.len() == before {
            return Err(TaskError::NotFound(id));
        }
        self.save(&remaining)?;
        info!("Deleted task {}", id);
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<Task>, TaskError> {
        self.list(StatusFilter::All)
    }

    pub fn list(&self, filter: StatusFilter) -> Result<Vec<Task>, TaskError> {
        let tasks = self.load()?;
        Ok(tasks.into_iter().filter(|task| filter.matches(task)).collect())
    }

    fn modify(
        &self,
        id: u32,
        apply: impl FnOnce(&mut Task, NaiveDateTime),
    ) -> Result<(), TaskError> {
        let mut tasks = self.load()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .ok_or(TaskError::NotFound(id))?;
        apply(task, self.clock.now());
        self.save(&tasks)
    }

    fn parse(&self, contents: &[u8]) -> Result<Vec<Task>, TaskError> {
        serde_json::from_slice(contents).map_err(|source| TaskError::CorruptData {
            path: self.path.clone(),
            source,
        })
    }

    // Readers only ever see the old file or the complete new one.
    fn save(&self, tasks: &[Task]) -> Result<(), TaskError> {
        let temp_path = self.temp_path();
        let written =
            write_pretty(&temp_path, tasks).and_then(|()| self.keep_permissions(&temp_path));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(TaskError::io(&self.path, err));
        }
        debug!("Saved {} tasks to {}", tasks.len(), self.path.display());
        Ok(())
    }

    // The replacement file inherits the mode of the file it replaces.
    fn keep_permissions(&self, temp_path: &Path) -> Result<(), TaskError> {
        match fs::metadata(&self.path) {
            Ok(metadata) => fs::set_permissions(temp_path, metadata.permissions())
                .map_err(|err| TaskError::io(temp_path, err)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(TaskError::io(&self.path, err)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Returns the first task with the given id.
///
/// A missing id is a normal outcome, reported to the user as a warning.
pub fn find_by_id(tasks: &[Task], id: u32) -> Option<&Task> {
    let found = tasks.iter().find(|task| task.id() == id);
    if found.is_none() {
        warn!("No task found with ID {}", id);
    }
    found
}

fn next_id(tasks: &[Task]) -> Result<u32, TaskError> {
    match tasks.iter().map(Task::id).max() {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or(TaskError::IdsExhausted),
    }
}

fn write_pretty(path: &Path, tasks: &[Task]) -> Result<(), TaskError> {
    let file = fs::File::create(path).map_err(|err| TaskError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer, path, tasks)?;
    let file = writer
        .into_inner()
        .map_err(|err| TaskError::io(path, err.into_error()))?;
    file.sync_all().map_err(|err| TaskError::io(path, err))
}

fn encode(writer: &mut impl Write, path: &Path, tasks: &[Task]) -> Result<(), TaskError> {
    let mut serializer = Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(b"    "));
    tasks.serialize(&mut serializer).map_err(|err| {
        if err.is_io() {
            TaskError::io(path, err.into())
        } else {
            TaskError::Serialize(err)
        }
    })?;
    writer.write_all(b"\n").map_err(|err| TaskError::io(path, err))
}
