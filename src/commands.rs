use chrono::{Local, NaiveDate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::auth::{AuthError, IdentityProvider, User};
use crate::board::Board;
use crate::collection::CategorizedTasks;
use crate::due::DueStatus;
use crate::error::{BoardError, Result};
use crate::models::{Category, Task, TaskId};
use crate::reconcile::DragEnd;
use crate::store::TaskStore;

/// Fields given on the command line for `add` and `edit`.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    /// Raw due date; an empty string clears it.
    pub due: Option<String>,
}

/// Fails unless someone is signed in.
pub fn require_user<P: IdentityProvider + ?Sized>(identity: &P) -> Result<User> {
    identity
        .current_user()
        .ok_or_else(|| AuthError::NotSignedIn.into())
}

/// Builds the board listing: one row per task, grouped by category in board
/// order.
pub fn board_table(tasks: &CategorizedTasks, today: NaiveDate) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
        ]);

    for (category, column) in tasks.iter() {
        let category_color = match category {
            Category::Todo => Color::Yellow,
            Category::InProgress => Color::Cyan,
            Category::Done => Color::Green,
        };
        for (index, t) in column.iter().enumerate() {
            let status = DueStatus::of(t, today);
            table.add_row(vec![
                Cell::new(category).fg(category_color),
                Cell::new(index),
                Cell::new(&t.id),
                Cell::new(&t.title),
                Cell::new(&t.description),
                Cell::new(t.due_date.map(|d| d.to_string()).unwrap_or_default()),
                Cell::new(status.label()).fg(if status.is_pressing() { Color::Red } else { Color::Reset }),
            ]);
        }
    }
    table
}

/// Lists every task on the board.
pub async fn cmd_list<S: TaskStore>(board: &mut Board<S>) -> Result<()> {
    board.load().await?;
    if board.tasks().is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    let today = Local::now().date_naive();
    println!("{}", board_table(board.tasks(), today));
    Ok(())
}

/// Adds a new task through the board form, so the same validation applies.
pub async fn cmd_add<S: TaskStore>(board: &mut Board<S>, fields: TaskFields) -> Result<Task> {
    board.form_mut().open_create();
    fill_draft(board, fields);
    let task = board.submit_form().await?;
    println!("Task added (id = {})", task.id);
    Ok(task)
}

/// Edits an existing task's details. Fields left out keep their value.
pub async fn cmd_edit<S: TaskStore>(board: &mut Board<S>, id: &TaskId, fields: TaskFields) -> Result<Task> {
    board.load().await?;
    let task = board
        .tasks()
        .get(id)
        .cloned()
        .ok_or_else(|| BoardError::not_found(id))?;
    board.form_mut().open_edit(&task);
    fill_draft(board, fields);
    let task = board.submit_form().await?;
    println!("Task {} updated.", id);
    Ok(task)
}

fn fill_draft<S: TaskStore>(board: &mut Board<S>, fields: TaskFields) {
    if let Some(draft) = board.form_mut().draft_mut() {
        if let Some(t) = fields.title {
            draft.title = t;
        }
        if let Some(d) = fields.description {
            draft.description = d;
        }
        if let Some(c) = fields.category {
            draft.category = c;
        }
        if let Some(d) = fields.due {
            draft.due_date = d;
        }
    }
}

/// Removes a task from the board and the backend.
pub async fn cmd_remove<S: TaskStore>(board: &mut Board<S>, id: &TaskId) -> Result<()> {
    board.delete(id).await?;
    println!("Task {} removed.", id);
    Ok(())
}

/// Moves a task into another category, at `index` or at the end.
pub async fn cmd_move<S: TaskStore>(
    board: &mut Board<S>,
    id: &TaskId,
    category: Category,
    index: Option<usize>,
) -> Result<()> {
    board.load().await?;
    let event = board.drag_to(id, category, index.unwrap_or(usize::MAX))?;
    board.drag(&event).await?;
    let position = board.tasks().locate(id).map(|(_, i)| i).unwrap_or_default();
    println!("Task {} moved to {} (position {}).", id, category, position);
    Ok(())
}

/// Moves the task at position `from` of a category to position `to`.
pub async fn cmd_reorder<S: TaskStore>(board: &mut Board<S>, category: Category, from: usize, to: usize) -> Result<()> {
    board.load().await?;
    let column = board.tasks().column(category);
    let task = column.get(from).ok_or(BoardError::IndexOutOfRange {
        category,
        index: from,
        len: column.len(),
    })?;
    let event = DragEnd::new(task.id.clone(), category, from).over(category, to);
    board.drag(&event).await?;
    let titles: Vec<&str> = board
        .tasks()
        .column(category)
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    println!("{}: {}", category, titles.join(" | "));
    Ok(())
}

pub async fn cmd_signup<P: IdentityProvider + ?Sized>(identity: &P, email: &str, password: &str) -> Result<()> {
    let user = identity.sign_up(email, password).await?;
    println!("Account created. Signed in as {}.", user.email);
    Ok(())
}

pub async fn cmd_login<P: IdentityProvider + ?Sized>(identity: &P, email: &str, password: &str) -> Result<()> {
    let user = identity.sign_in(email, password).await?;
    println!("Signed in as {}.", user.email);
    Ok(())
}

pub async fn cmd_logout<P: IdentityProvider + ?Sized>(identity: &P) -> Result<()> {
    identity.sign_out().await?;
    println!("Signed out.");
    Ok(())
}

pub fn cmd_whoami<P: IdentityProvider + ?Sized>(identity: &P) -> Result<()> {
    let user = require_user(identity)?;
    println!("{} ({})", user.email, user.provider);
    Ok(())
}

pub async fn cmd_reset_password<P: IdentityProvider + ?Sized>(identity: &P, email: &str) -> Result<()> {
    identity.send_password_reset(email).await?;
    println!("Password reset email is sent to {}.", email.trim());
    Ok(())
}
