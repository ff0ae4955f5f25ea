use async_trait::async_trait;
use parking_lot::Mutex;

use super::{delete_flat, move_flat, next_id, reorder_flat, update_flat, TaskStore};
use crate::error::{Result, TransportError};
use crate::models::{Category, Task, TaskId, TaskInput, TaskPatch};

/// A request received by [`MemoryTaskStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List,
    Create(TaskInput),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
    Reorder {
        category: Category,
        ids: Vec<TaskId>,
    },
    Move {
        id: TaskId,
        category: Category,
        ids: Vec<TaskId>,
    },
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    calls: Vec<StoreCall>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-process backend with the same semantics as the file backend.
///
/// Records every call, and can be switched into failing reads or writes.
/// Failed calls are still recorded but change nothing.
#[derive(Default)]
pub struct MemoryTaskStore {
    state: Mutex<State>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing backend order.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            state: Mutex::new(State {
                tasks,
                ..State::default()
            }),
        }
    }

    /// Snapshot of the stored tasks in backend order.
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    fn write<T>(&self, call: StoreCall, f: impl FnOnce(&mut Vec<Task>) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.fail_writes {
            return Err(TransportError::Simulated.into());
        }
        // Work on a copy so a failing operation persists nothing.
        let mut tasks = state.tasks.clone();
        let out = f(&mut tasks)?;
        state.tasks = tasks;
        Ok(out)
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::List);
        if state.fail_reads {
            return Err(TransportError::Simulated.into());
        }
        Ok(state.tasks.clone())
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task> {
        self.write(StoreCall::Create(input.clone()), |tasks| {
            let task = Task::from_input(next_id(), input.clone());
            tasks.push(task.clone());
            Ok(task)
        })
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>> {
        self.write(StoreCall::Update(id.clone(), patch.clone()), |tasks| {
            let updated = update_flat(tasks, id, patch)?;
            Ok(patch.is_full().then_some(updated))
        })
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.write(StoreCall::Delete(id.clone()), |tasks| delete_flat(tasks, id))
    }

    async fn reorder_within_category(&self, category: Category, ordered_ids: &[TaskId]) -> Result<()> {
        let call = StoreCall::Reorder {
            category,
            ids: ordered_ids.to_vec(),
        };
        self.write(call, |tasks| {
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
        let call = StoreCall::Move {
            id: id.clone(),
            category,
            ids: ordered_ids.to_vec(),
        };
        self.write(call, |tasks| move_flat(tasks, id, category, ordered_ids))
    }
}
