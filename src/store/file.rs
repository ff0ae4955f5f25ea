use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{delete_flat, move_flat, next_id, reorder_flat, update_flat, TaskStore};
use crate::error::Result;
use crate::models::{Category, Task, TaskId, TaskInput, TaskPatch};
use crate::storage::{read_json, tasks_path, write_json};

/// Offline backend: the flat task list lives in a pretty-printed JSON file.
///
/// Every operation reads the whole file, applies the change and writes it
/// back through [`write_json`], which replaces the file only once the new
/// document is fully written.
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    path: PathBuf,
}

impl FileTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the default location (`TASKS_DB` or the data directory).
    pub fn open_default() -> Self {
        Self::new(tasks_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Task>> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        write_json(&self.path, tasks)?;
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Task>) -> Result<T>) -> Result<T> {
        let mut tasks = self.load()?;
        let out = f(&mut tasks)?;
        self.save(&tasks)?;
        Ok(out)
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let tasks = self.load()?;
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task> {
        self.modify(|tasks| {
            let task = Task::from_input(next_id(), input.clone());
            tasks.push(task.clone());
            Ok(task)
        })
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>> {
        self.modify(|tasks| update_flat(tasks, id, patch).map(Some))
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.modify(|tasks| delete_flat(tasks, id))
    }

    async fn reorder_within_category(&self, category: Category, ordered_ids: &[TaskId]) -> Result<()> {
        self.modify(|tasks| {
            reorder_flat(tasks, category, ordered_ids);
            Ok(())
        })
    }

    async fn move_across_category(
        &self,
        id: &TaskId,
        category: Category,
        ordered_ids: &[TaskId],
    ) -> Result<()> {
        self.modify(|tasks| move_flat(tasks, id, category, ordered_ids))
    }
}
