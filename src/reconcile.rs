//! Drag reconciliation.
//!
//! Every board mutation is split in two halves: a synchronous local change
//! to [`CategorizedTasks`], and the store call that persists it. The
//! functions here perform the local half and hand back a [`PendingWrite`]
//! describing the second half, together with an [`Undo`] that restores the
//! board if the write fails and the [`UpdatePolicy`] asks for it.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::collection::CategorizedTasks;
use crate::error::{BoardError, Result};
use crate::models::{Category, Task, TaskId, TaskPatch};
use crate::store::TaskStore;

/// What happens to a local change whose write fails.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Keep the change; the next full fetch brings the backend's state back.
    #[default]
    Optimistic,
    /// Undo the change right away.
    Rollback,
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePolicy::Optimistic => f.write_str("optimistic"),
            UpdatePolicy::Rollback => f.write_str("rollback"),
        }
    }
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "optimistic" => Ok(UpdatePolicy::Optimistic),
            "rollback" | "pessimistic" => Ok(UpdatePolicy::Rollback),
            _ => Err(format!("unknown update policy '{}'. Use optimistic or rollback.", s)),
        }
    }
}

/// Where a dragged task was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub category: Category,
    pub index: usize,
}

/// The end of a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active_id: TaskId,
    pub active_category: Category,
    pub active_index: usize,
    /// `None` when the task was released outside every column.
    pub over: Option<DropTarget>,
}

impl DragEnd {
    pub fn new(active_id: TaskId, active_category: Category, active_index: usize) -> Self {
        Self {
            active_id,
            active_category,
            active_index,
            over: None,
        }
    }

    pub fn over(mut self, category: Category, index: usize) -> Self {
        self.over = Some(DropTarget { category, index });
        self
    }
}

/// A store call that persists a change already applied locally.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Reorder {
        category: Category,
        ids: Vec<TaskId>,
    },
    Move {
        id: TaskId,
        category: Category,
        ids: Vec<TaskId>,
    },
    Update {
        id: TaskId,
        patch: TaskPatch,
    },
    Delete {
        id: TaskId,
    },
}

impl WriteOp {
    /// Sends the call. Only updates may return a task.
    pub async fn send<S: TaskStore + ?Sized>(&self, store: &S) -> Result<Option<Task>> {
        match self {
            WriteOp::Reorder { category, ids } => {
                store.reorder_within_category(*category, ids).await?;
                Ok(None)
            }
            WriteOp::Move { id, category, ids } => {
                store.move_across_category(id, *category, ids).await?;
                Ok(None)
            }
            WriteOp::Update { id, patch } => store.update_task(id, patch).await,
            WriteOp::Delete { id } => {
                store.delete_task(id).await?;
                Ok(None)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            WriteOp::Reorder { category, .. } => format!("reorder {}", category),
            WriteOp::Move { id, category, .. } => format!("move {} to {}", id, category),
            WriteOp::Update { id, .. } => format!("update {}", id),
            WriteOp::Delete { id } => format!("delete {}", id),
        }
    }
}

/// A task's state before a local change.
#[derive(Debug, Clone, PartialEq)]
pub struct Undo {
    task: Task,
    category: Category,
    index: usize,
}

impl Undo {
    /// Records where `id` is now, and what it looks like.
    pub fn capture(tasks: &CategorizedTasks, id: &TaskId) -> Option<Undo> {
        let (category, index) = tasks.locate(id)?;
        let task = tasks.column(category)[index].clone();
        Some(Undo {
            task,
            category,
            index,
        })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Puts the task back where it was, as it was.
    ///
    /// Works by id, so changes made to other tasks since the capture are
    /// kept; the old index is clamped to the current sequence length.
    pub fn apply(self, tasks: &mut CategorizedTasks) {
        let mut task = self.task;
        task.category = self.category;
        tasks.insert_at(task, self.index);
    }
}

/// A local change waiting for its store call.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub op: WriteOp,
    pub undo: Option<Undo>,
}

/// Finds the dragged task, trusting the event's index only if it still
/// points at the dragged id.
fn resolve_active(tasks: &CategorizedTasks, event: &DragEnd) -> Result<(Category, usize)> {
    let at_index = tasks
        .column(event.active_category)
        .get(event.active_index)
        .map(|t| &t.id);
    if at_index == Some(&event.active_id) {
        return Ok((event.active_category, event.active_index));
    }
    tasks
        .locate(&event.active_id)
        .ok_or_else(|| BoardError::not_found(&event.active_id))
}

/// Applies a drag locally and returns the write that persists it.
///
/// A drop outside every column is a no-op and returns `None`. A drop inside
/// the task's own column reorders that column (the target index clamped to
/// the last position), even if the order ends up unchanged. A drop on another
/// column moves the task there, at the target index clamped to the column
/// length, and sets its category.
pub fn apply_drag(tasks: &mut CategorizedTasks, event: &DragEnd) -> Result<Option<PendingWrite>> {
    let Some(over) = event.over else {
        debug!(id = %event.active_id, "drag released outside the board");
        return Ok(None);
    };
    let (category, index) = resolve_active(tasks, event)?;
    let undo = Undo::capture(tasks, &event.active_id);

    let op = if category == over.category {
        let last = tasks.column(category).len().saturating_sub(1);
        let to = over.index.min(last);
        tasks.move_within_category(category, index, to)?;
        debug!(id = %event.active_id, %category, from = index, to, "reordered");
        WriteOp::Reorder {
            category,
            ids: tasks.ids(category),
        }
    } else {
        let to = tasks.move_across_categories(category, index, over.category, over.index)?;
        debug!(id = %event.active_id, from = %category, to = %over.category, index = to, "moved");
        WriteOp::Move {
            id: event.active_id.clone(),
            category: over.category,
            ids: tasks.ids(over.category),
        }
    };
    Ok(Some(PendingWrite { op, undo }))
}

/// Removes a task locally and returns the delete call.
///
/// The call is returned even when the task is not on the board, since the
/// backend may still hold it.
pub fn apply_delete(tasks: &mut CategorizedTasks, id: &TaskId) -> PendingWrite {
    let undo = Undo::capture(tasks, id);
    tasks.remove_by_id(id);
    PendingWrite {
        op: WriteOp::Delete { id: id.clone() },
        undo,
    }
}

/// Swaps in an edited task locally and returns the update call.
///
/// A category change appends the task to its new column.
pub fn apply_update(tasks: &mut CategorizedTasks, id: &TaskId, patch: TaskPatch) -> Result<PendingWrite> {
    let undo = Undo::capture(tasks, id).ok_or_else(|| BoardError::not_found(id))?;
    let mut updated = undo.task().clone();
    updated.apply(&patch);
    tasks.replace(id, updated)?;
    Ok(PendingWrite {
        op: WriteOp::Update {
            id: id.clone(),
            patch,
        },
        undo: Some(undo),
    })
}
