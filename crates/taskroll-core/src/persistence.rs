//! Per-user task persistence: one JSON file per user id.

use std::{collections::HashMap, path::Path, path::PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::task_store::TaskStore;

/// Writes text using a temp file + rename so readers never observe partial data.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("destination path cannot be empty");
    }
    if path.exists() && path.is_dir() {
        bail!("destination path '{}' is a directory", path.display());
    }

    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("failed to create {}", parent_dir.display()))?;

    let temp_name = format!(
        ".{}.tmp-{}-{}",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("tasks"),
        std::process::id(),
        current_unix_timestamp()
    );
    let temp_path = parent_dir.join(temp_name);
    std::fs::write(&temp_path, content)
        .with_context(|| format!("failed to write temporary file {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path).with_context(|| {
        format!(
            "failed to rename temporary task file {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// On-disk shape of one user file: `{"tasks": {name: priority}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserTasksFile {
    #[serde(default)]
    tasks: TaskStore,
}

/// Directory of `<user id>.json` files, one per user.
///
/// Loads tolerate strangers in the directory: entries without a `.json`
/// extension (leftover temp files included) are ignored outright, and
/// `.json` files without a numeric stem or with unreadable or
/// unparseable contents are logged and skipped rather than failing
/// startup. Loaded priorities are clamped to the ceiling; zeroed
/// entries are kept for the next lazy clean.
#[derive(Debug, Clone)]
pub struct TaskFileStore {
    data_dir: PathBuf,
}

impl TaskFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn user_path(&self, user: UserId) -> PathBuf {
        self.data_dir.join(format!("{user}.json"))
    }

    /// Reads every user file in the data directory. A missing directory
    /// is an empty store, not an error.
    pub fn load_all(&self) -> Result<HashMap<UserId, TaskStore>> {
        let mut loaded = HashMap::new();
        if !self.data_dir.exists() {
            return Ok(loaded);
        }

        let entries = std::fs::read_dir(&self.data_dir)
            .with_context(|| format!("failed to read data dir {}", self.data_dir.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to list data dir {}", self.data_dir.display()))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(user) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u64>().ok())
            else {
                tracing::warn!(
                    path = %path.display(),
                    "skipping task file without a numeric user id stem"
                );
                continue;
            };

            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %error,
                        "skipping unreadable task file"
                    );
                    continue;
                }
            };
            let file = match serde_json::from_str::<UserTasksFile>(&raw) {
                Ok(file) => file,
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %error,
                        "skipping unparseable task file"
                    );
                    continue;
                }
            };
            let mut tasks = file.tasks;
            tasks.clamp_to_ceiling();
            loaded.insert(UserId(user), tasks);
        }
        Ok(loaded)
    }

    /// Writes one user's tasks atomically.
    pub fn save(&self, user: UserId, tasks: &TaskStore) -> Result<()> {
        let file = UserTasksFile {
            tasks: tasks.clone(),
        };
        let mut payload = serde_json::to_string_pretty(&file)
            .with_context(|| format!("failed to serialize tasks for user {user}"))?;
        payload.push('\n');
        let path = self.user_path(user);
        write_text_atomic(&path, &payload)
            .with_context(|| format!("failed to write task file {}", path.display()))?;
        Ok(())
    }
}
