use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enumerate::{SkipCounts, Task};
use crate::error::{Error, Result};
use crate::types::FailurePolicy;

/// What happened to one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskOutcome {
    Completed,
    Failed { reason: String },
    /// The batch was cancelled before this task started
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    pub task: Task,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

/// Aggregated outcome of a run, entries in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub skipped: SkipCounts,
    pub entries: Vec<TaskReport>,
}

impl Default for BatchReport {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            skipped: SkipCounts::default(),
            entries: Vec::new(),
        }
    }
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn completed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == TaskOutcome::Completed)
            .count()
    }

    pub fn cancelled(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == TaskOutcome::Cancelled)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.skipped.total()
    }

    /// Failed tasks with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&Task, &str)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            TaskOutcome::Failed { reason } => Some((&e.task, reason.as_str())),
            _ => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn outcome_of(&self, source: &Path) -> Option<&TaskOutcome> {
        self.entries
            .iter()
            .find(|e| e.task.source == source)
            .map(|e| &e.outcome)
    }

    /// Apply the exit-status policy: `Fail` turns any failed task into an error.
    pub fn check(&self, policy: FailurePolicy) -> Result<()> {
        match policy {
            FailurePolicy::Ignore => Ok(()),
            FailurePolicy::Fail => {
                let failed = self.failed();
                if failed == 0 {
                    Ok(())
                } else {
                    Err(Error::BatchFailed {
                        failed,
                        total: self.total(),
                    })
                }
            }
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::encode(path, e))?;
        std::fs::write(path, json).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
