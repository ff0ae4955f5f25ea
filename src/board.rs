//! The board session: the task collection, the form and the store, plus the
//! update policy that decides what a failed write does to local state.
//!
//! Mutations come in two phases so a UI can redraw between them:
//! `begin_*` applies the change locally and returns a [`PendingWrite`],
//! [`Board::commit`] sends it. The one-shot methods ([`Board::drag`],
//! [`Board::delete`]) do both.

use tracing::{debug, info, warn};

use crate::collection::CategorizedTasks;
use crate::error::{BoardError, Result, ValidationError};
use crate::form::{FormMode, TaskForm};
use crate::models::{Category, Task, TaskId, TaskInput, TaskPatch};
use crate::reconcile::{apply_delete, apply_drag, apply_update, DragEnd, PendingWrite, UpdatePolicy, WriteOp};
use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardOptions {
    pub policy: UpdatePolicy,
    /// Whether the form rejects an empty description.
    pub require_description: bool,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            policy: UpdatePolicy::Optimistic,
            require_description: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    /// The initial fetch failed; the board is empty.
    Failed(String),
}

/// A message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

pub struct Board<S> {
    store: S,
    tasks: CategorizedTasks,
    form: TaskForm,
    policy: UpdatePolicy,
    load_state: LoadState,
    notice: Option<Notice>,
}

impl<S: TaskStore> Board<S> {
    pub fn new(store: S, options: BoardOptions) -> Self {
        Self {
            store,
            tasks: CategorizedTasks::new(),
            form: TaskForm::new(options.require_description),
            policy: options.policy,
            load_state: LoadState::NotLoaded,
            notice: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tasks(&self) -> &CategorizedTasks {
        &self.tasks
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TaskForm {
        &mut self.form
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Marks the board as loading, so a UI can draw the indicator before
    /// awaiting [`Board::load`].
    pub fn begin_load(&mut self) {
        self.load_state = LoadState::Loading;
    }

    /// Fetches every task and rebuilds the board from scratch.
    ///
    /// On failure the board is left empty in the `Failed` state.
    pub async fn load(&mut self) -> Result<()> {
        self.load_state = LoadState::Loading;
        match self.store.list_tasks().await {
            Ok(flat) => {
                self.tasks.rebuild_from(&flat);
                self.load_state = LoadState::Loaded;
                info!(count = self.tasks.len(), "board loaded");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load tasks: {}", e);
                self.tasks = CategorizedTasks::new();
                self.load_state = LoadState::Failed(e.to_string());
                self.notice = Some(Notice::Error(format!("Could not load tasks: {}", e)));
                Err(e)
            }
        }
    }

    /// Builds the drag event that moves `id` to `category` at `index`.
    pub fn drag_to(&self, id: &TaskId, category: Category, index: usize) -> Result<DragEnd> {
        let (from, from_index) = self.tasks.locate(id).ok_or_else(|| BoardError::not_found(id))?;
        Ok(DragEnd::new(id.clone(), from, from_index).over(category, index))
    }

    pub fn begin_drag(&mut self, event: &DragEnd) -> Result<Option<PendingWrite>> {
        apply_drag(&mut self.tasks, event)
    }

    pub fn begin_delete(&mut self, id: &TaskId) -> PendingWrite {
        apply_delete(&mut self.tasks, id)
    }

    /// Sends a pending write and applies the update policy if it fails.
    ///
    /// A delete of a task the backend no longer has counts as success.
    pub async fn commit(&mut self, pending: PendingWrite) -> Result<()> {
        let PendingWrite { op, undo } = pending;
        debug!(op = %op.describe(), "persisting");
        match op.send(&self.store).await {
            Ok(Some(stored)) => {
                let id = stored.id.clone();
                if let Err(e) = self.tasks.replace(&id, stored) {
                    debug!("Stored task no longer on the board: {}", e);
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(BoardError::NotFound { id }) if matches!(op, WriteOp::Delete { .. }) => {
                info!(%id, "task was already gone from the backend");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to {}: {}", op.describe(), e);
                let mut message = format!("Could not {}: {}", op.describe(), e);
                if self.policy == UpdatePolicy::Rollback {
                    if let Some(undo) = undo {
                        undo.apply(&mut self.tasks);
                        message.push_str(" (change undone)");
                    }
                }
                self.notice = Some(Notice::Error(message));
                Err(e)
            }
        }
    }

    /// Applies a drag and persists it. A drop outside the board does nothing.
    pub async fn drag(&mut self, event: &DragEnd) -> Result<()> {
        match self.begin_drag(event)? {
            Some(pending) => self.commit(pending).await,
            None => Ok(()),
        }
    }

    pub async fn delete(&mut self, id: &TaskId) -> Result<()> {
        let pending = self.begin_delete(id);
        self.commit(pending).await?;
        self.notice = Some(Notice::Info(format!("Task {} deleted", id)));
        Ok(())
    }

    /// Validates and submits the open form.
    ///
    /// Creating waits for the backend id, then appends the new task. Editing
    /// swaps the edited task in first and then sends the update. The form
    /// closes only on success; on failure it stays open with the error.
    /// Returns the task as it now sits on the board.
    pub async fn submit_form(&mut self) -> Result<Task> {
        let input = match self.form.validate() {
            Ok(input) => input,
            Err(e) => {
                self.form.set_error(e.to_string());
                return Err(e.into());
            }
        };

        let result = match self.form.mode() {
            FormMode::Idle => return Err(ValidationError::NoDraft.into()),
            FormMode::Creating => self.create(&input).await,
            FormMode::Editing => {
                let id = self
                    .form
                    .draft()
                    .and_then(|d| d.id.clone())
                    .ok_or(ValidationError::NoDraft)?;
                self.update(&id, TaskPatch::from(input)).await
            }
        };

        match result {
            Ok(task) => {
                self.form.cancel();
                Ok(task)
            }
            Err(e) => {
                self.form.set_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn create(&mut self, input: &TaskInput) -> Result<Task> {
        match self.store.create_task(input).await {
            Ok(task) => {
                info!(id = %task.id, "task created");
                self.notice = Some(Notice::Info(format!("Task {} added", task.id)));
                self.tasks.insert(task.clone());
                Ok(task)
            }
            Err(e) => {
                warn!("Failed to create task: {}", e);
                self.notice = Some(Notice::Error(format!("Could not add task: {}", e)));
                Err(e)
            }
        }
    }

    async fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        let pending = apply_update(&mut self.tasks, id, patch)?;
        self.commit(pending).await?;
        self.notice = Some(Notice::Info(format!("Task {} updated", id)));
        self.tasks
            .get(id)
            .cloned()
            .ok_or_else(|| BoardError::not_found(id))
    }
}
