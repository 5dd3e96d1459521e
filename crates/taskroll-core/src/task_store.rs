//! Per-user task storage with lazy pruning of zeroed entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::weights::MAX_PRIORITY;

/// Priority assigned to a task the first time it is edited.
pub const DEFAULT_PRIORITY: i64 = 1;

/// One user's task list: task name to stored priority.
///
/// Entries at or below zero are deleted tasks awaiting the next
/// [`TaskStore::clean`]; iteration is name-ordered so rendering and
/// persistence stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: BTreeMap<String, i64>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn get(&self, task: &str) -> Option<i64> {
        self.tasks.get(task).copied()
    }

    /// Returns the stored priority, or [`DEFAULT_PRIORITY`] for an unknown
    /// task. Never mutates; the caller decides whether to upsert.
    pub fn get_or_default(&self, task: &str) -> i64 {
        self.get(task).unwrap_or(DEFAULT_PRIORITY)
    }

    /// Upserts a priority the caller has already clamped to [0, 100].
    pub fn set(&mut self, task: &str, priority: i64) {
        self.tasks.insert(task.to_string(), priority);
    }

    /// Applies a delta to an existing task, clamped to [0, 100], and
    /// returns the new priority. Unknown tasks are reported, not created;
    /// the engine reconciles the session that referenced them.
    pub fn adjust(&mut self, task: &str, delta: i64) -> Result<i64, EngineError> {
        let Some(current) = self.tasks.get_mut(task) else {
            return Err(EngineError::TaskNotFound {
                task: task.to_string(),
            });
        };
        *current = current.saturating_add(delta).clamp(0, MAX_PRIORITY);
        Ok(*current)
    }

    /// Removes a task outright; true when it existed.
    pub fn remove(&mut self, task: &str) -> bool {
        self.tasks.remove(task).is_some()
    }

    /// Drops every entry at or below zero priority, returning how many
    /// were removed so callers can skip a persistence write when nothing
    /// changed.
    pub fn clean(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, priority| *priority > 0);
        before - self.tasks.len()
    }

    /// Entries in task-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.tasks
            .iter()
            .map(|(task, priority)| (task.as_str(), *priority))
    }

    /// Clamps every priority to the ceiling. Loaded files are the only
    /// priority source the bot does not clamp on the way in.
    pub fn clamp_to_ceiling(&mut self) {
        for priority in self.tasks.values_mut() {
            *priority = (*priority).min(MAX_PRIORITY);
        }
    }
}
