//! Result files
//!
//! One Markdown file per task under the results directory, named
//! `{prefix}_{YYYYMMDD}_{HHMMSS}.md`. Files are never overwritten: a second
//! task finishing in the same second gets a `_1`, `_2`, ... suffix.

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::config::ResultsConfig;
use crate::core::Result;

/// Upper bound on same-second suffixes before giving up
const MAX_COLLISION_SUFFIX: u32 = 1000;

/// How a task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Result text returned by the agent
    Success(String),
    /// Normalized failure message
    Failure(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    pub fn body(&self) -> &str {
        match self {
            TaskOutcome::Success(text) | TaskOutcome::Failure(text) => text,
        }
    }
}

/// Everything persisted about one task
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub timestamp: DateTime<Local>,
    pub task: String,
    pub outcome: TaskOutcome,
}

impl TaskRecord {
    pub fn new(timestamp: DateTime<Local>, task: impl Into<String>, outcome: TaskOutcome) -> Self {
        Self {
            timestamp,
            task: task.into(),
            outcome,
        }
    }

    /// Render the Markdown document: timestamp, task, then result
    pub fn to_markdown(&self) -> String {
        let status = if self.outcome.is_success() {
            "completed"
        } else {
            "failed"
        };

        format!(
            "# Task Result\n\n\
             **Timestamp:** {}\n\n\
             ## Task\n\n\
             {}\n\n\
             ## Result ({})\n\n\
             {}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.task,
            status,
            self.outcome.body()
        )
    }
}

/// Writes [`TaskRecord`]s into a results directory
#[derive(Debug, Clone)]
pub struct ResultWriter {
    dir: PathBuf,
    prefix: String,
}

impl ResultWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &ResultsConfig) -> Self {
        Self::new(config.dir.clone(), config.file_prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem for a timestamp, at second precision
    pub fn file_stem(&self, timestamp: &DateTime<Local>) -> String {
        format!("{}_{}", self.prefix, timestamp.format("%Y%m%d_%H%M%S"))
    }

    /// Persist a record, creating the directory if needed. Returns the path written.
    pub fn write(&self, record: &TaskRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| with_path(e, &self.dir))?;

        let stem = self.file_stem(&record.timestamp);
        let content = record.to_markdown();

        for attempt in 0..=MAX_COLLISION_SUFFIX {
            let name = if attempt == 0 {
                format!("{}.md", stem)
            } else {
                format!("{}_{}.md", stem, attempt)
            };
            let path = self.dir.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!("{} exists, trying next suffix", path.display());
                    continue;
                }
                Err(e) => return Err(with_path(e, &path).into()),
            };

            file.write_all(content.as_bytes())
                .and_then(|_| file.flush())
                .map_err(|e| with_path(e, &path))?;

            tracing::info!("result saved to {}", path.display());
            return Ok(path);
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free result file name for {} in {}", stem, self.dir.display()),
        )
        .into())
    }
}

fn with_path(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
}
