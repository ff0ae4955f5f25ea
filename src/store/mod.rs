//! Task persistence backends.
//!
//! [`TaskStore`] is the contract the board depends on. Three backends
//! implement it:
//!
//! * [`HttpTaskStore`] talks to the REST task service.
//! * [`FileTaskStore`] keeps tasks in a local JSON file for offline use.
//! * [`MemoryTaskStore`] keeps tasks in memory and records every call.
//!
//! Every operation is atomic from the caller's point of view: it either
//! succeeds as a whole or persists nothing.

mod file;
mod http;
mod memory;

pub use file::FileTaskStore;
pub use http::HttpTaskStore;
pub use memory::{MemoryTaskStore, StoreCall};

use async_trait::async_trait;

use crate::error::{BoardError, Result};
use crate::models::{Category, Task, TaskId, TaskInput, TaskPatch};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetches every task, in backend order.
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Creates a task; the returned record carries the backend-assigned id.
    async fn create_task(&self, input: &TaskInput) -> Result<Task>;

    /// Updates a task. A full patch may echo the stored record back.
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>>;

    async fn delete_task(&self, id: &TaskId) -> Result<()>;

    /// Persists the order of one category.
    async fn reorder_within_category(&self, category: Category, ordered_ids: &[TaskId]) -> Result<()>;

    /// Persists a move into `category` together with the destination order.
    async fn move_across_category(
        &self,
        id: &TaskId,
        category: Category,
        ordered_ids: &[TaskId],
    ) -> Result<()>;
}

#[async_trait]
impl<T: TaskStore + ?Sized> TaskStore for Box<T> {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        (**self).list_tasks().await
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task> {
        (**self).create_task(input).await
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>> {
        (**self).update_task(id, patch).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        (**self).delete_task(id).await
    }

    async fn reorder_within_category(&self, category: Category, ordered_ids: &[TaskId]) -> Result<()> {
        (**self).reorder_within_category(category, ordered_ids).await
    }

    async fn move_across_category(
        &self,
        id: &TaskId,
        category: Category,
        ordered_ids: &[TaskId],
    ) -> Result<()> {
        (**self).move_across_category(id, category, ordered_ids).await
    }
}

/// Generates an id for backends that assign their own.
pub(crate) fn next_id() -> TaskId {
    TaskId::new(uuid::Uuid::new_v4().simple().to_string())
}

// Flat-list operations shared by the local backends. The backend keeps one
// ordered list; a category's order is the order of its tasks within it.

pub(crate) fn update_flat(tasks: &mut [Task], id: &TaskId, patch: &TaskPatch) -> Result<Task> {
    let task = tasks
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| BoardError::not_found(id))?;
    task.apply(patch);
    Ok(task.clone())
}

pub(crate) fn delete_flat(tasks: &mut Vec<Task>, id: &TaskId) -> Result<()> {
    let pos = tasks
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| BoardError::not_found(id))?;
    tasks.remove(pos);
    Ok(())
}

/// Rewrites the relative order of `category`'s tasks.
///
/// Listed ids come first in the given order; tasks of the category that are
/// not listed keep their relative order after them. Ids that do not belong to
/// the category are ignored. Tasks of other categories do not move.
pub(crate) fn reorder_flat(tasks: &mut [Task], category: Category, ordered_ids: &[TaskId]) {
    let slots: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.category == category)
        .map(|(i, _)| i)
        .collect();
    let mut members: Vec<Task> = slots.iter().map(|&i| tasks[i].clone()).collect();
    members.sort_by_key(|t| {
        ordered_ids
            .iter()
            .position(|id| id == &t.id)
            .unwrap_or(ordered_ids.len())
    });
    for (slot, task) in slots.into_iter().zip(members) {
        tasks[slot] = task;
    }
}

pub(crate) fn move_flat(
    tasks: &mut [Task],
    id: &TaskId,
    category: Category,
    ordered_ids: &[TaskId],
) -> Result<()> {
    let task = tasks
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| BoardError::not_found(id))?;
    task.category = category;
    reorder_flat(tasks, category, ordered_ids);
    Ok(())
}
