//! In-memory board state: one ordered sequence of tasks per category.
//!
//! Every task lives in exactly one sequence and ids are unique across the
//! board. Sequence order is the order shown on the board and the order that
//! reorder/move calls persist.

use std::collections::HashSet;

use crate::error::{BoardError, Result};
use crate::models::{Category, Task, TaskId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedTasks {
    columns: [Vec<Task>; 3],
}

impl CategorizedTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets a flat fetch result. See [`CategorizedTasks::rebuild_from`].
    pub fn from_tasks(flat: &[Task]) -> Self {
        let mut tasks = Self::new();
        tasks.rebuild_from(flat);
        tasks
    }

    /// Replaces the whole board with `flat`, grouped by category.
    ///
    /// Within a category the fetch order is kept as is. A repeated id keeps
    /// its first occurrence.
    pub fn rebuild_from(&mut self, flat: &[Task]) {
        let mut seen = HashSet::new();
        let mut columns: [Vec<Task>; 3] = Default::default();
        for task in flat {
            if !seen.insert(task.id.clone()) {
                tracing::warn!(id = %task.id, "duplicate task id in fetch result, keeping the first");
                continue;
            }
            columns[task.category.index()].push(task.clone());
        }
        self.columns = columns;
    }

    pub fn column(&self, category: Category) -> &[Task] {
        &self.columns[category.index()]
    }

    fn column_mut(&mut self, category: Category) -> &mut Vec<Task> {
        &mut self.columns[category.index()]
    }

    /// Ids of one category in board order.
    pub fn ids(&self, category: Category) -> Vec<TaskId> {
        self.column(category).iter().map(|t| t.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Columns in board order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Task])> {
        Category::ALL.into_iter().map(move |c| (c, self.column(c)))
    }

    /// Where a task currently sits.
    pub fn locate(&self, id: &TaskId) -> Option<(Category, usize)> {
        Category::ALL.into_iter().find_map(|c| {
            self.column(c)
                .iter()
                .position(|t| &t.id == id)
                .map(|i| (c, i))
        })
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.locate(id).map(|(c, i)| &self.column(c)[i])
    }

    /// Appends a task to the end of its category.
    ///
    /// A task with the same id already on the board is removed first.
    pub fn insert(&mut self, task: Task) {
        self.remove_by_id(&task.id);
        self.column_mut(task.category).push(task);
    }

    /// Inserts a task into its category at `index`, clamped to the sequence
    /// length. Returns the index actually used.
    pub fn insert_at(&mut self, task: Task, index: usize) -> usize {
        self.remove_by_id(&task.id);
        let column = self.column_mut(task.category);
        let index = index.min(column.len());
        column.insert(index, task);
        index
    }

    /// Removes the task with `id` from whichever sequence holds it.
    ///
    /// Returns the removed task and its former position; `None` (and no
    /// change) if the id is not on the board.
    pub fn remove_by_id(&mut self, id: &TaskId) -> Option<(Category, usize, Task)> {
        let (category, index) = self.locate(id)?;
        let task = self.column_mut(category).remove(index);
        Some((category, index, task))
    }

    /// Moves the element at `from` to `to` inside one category, shifting the
    /// elements in between. Both indices must address existing elements.
    pub fn move_within_category(&mut self, category: Category, from: usize, to: usize) -> Result<()> {
        let len = self.column(category).len();
        for index in [from, to] {
            if index >= len {
                return Err(BoardError::IndexOutOfRange { category, index, len });
            }
        }
        let column = self.column_mut(category);
        let task = column.remove(from);
        column.insert(to, task);
        Ok(())
    }

    /// Moves the element at `from_index` of `from` into `to` at `to_index`
    /// and updates its category field.
    ///
    /// `to_index` is clamped to `[0, len]` of the destination. Returns the
    /// index the task ended up at.
    pub fn move_across_categories(
        &mut self,
        from: Category,
        from_index: usize,
        to: Category,
        to_index: usize,
    ) -> Result<usize> {
        let len = self.column(from).len();
        if from_index >= len {
            return Err(BoardError::IndexOutOfRange {
                category: from,
                index: from_index,
                len,
            });
        }
        let mut task = self.column_mut(from).remove(from_index);
        task.category = to;
        let column = self.column_mut(to);
        let index = to_index.min(column.len());
        column.insert(index, task);
        Ok(index)
    }

    /// Swaps in an updated copy of a task.
    ///
    /// If the category is unchanged the task keeps its position; otherwise it
    /// is appended to the end of its new category.
    pub fn replace(&mut self, id: &TaskId, updated: Task) -> Result<()> {
        self.replace_with(id, updated, None)
    }

    /// Like [`CategorizedTasks::replace`], but a category change inserts the
    /// task at `index` (clamped) instead of appending.
    pub fn replace_at(&mut self, id: &TaskId, updated: Task, index: usize) -> Result<()> {
        self.replace_with(id, updated, Some(index))
    }

    fn replace_with(&mut self, id: &TaskId, mut updated: Task, index: Option<usize>) -> Result<()> {
        let (category, position) = self.locate(id).ok_or_else(|| BoardError::not_found(id))?;
        // The id is immutable once assigned.
        updated.id = id.clone();
        if updated.category == category {
            self.column_mut(category)[position] = updated;
            return Ok(());
        }
        self.column_mut(category).remove(position);
        match index {
            Some(i) => {
                let column = self.column_mut(updated.category);
                let i = i.min(column.len());
                column.insert(i, updated);
            }
            None => self.column_mut(updated.category).push(updated),
        }
        Ok(())
    }
}
