use std::sync::Arc;

use tracing::warn;

use crate::auth::{IdentityProvider, User};
use crate::board::{Board, Notice};
use crate::models::{Category, Task, TaskId};
use crate::reconcile::{DragEnd, DropTarget, PendingWrite};
use crate::storage::{save_prefs, Prefs};
use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// State of the sign-in / sign-up screen.
#[derive(Debug, Clone)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub field: LoginField,
    /// Creating an account instead of signing in.
    pub sign_up: bool,
    pub message: Option<String>,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            field: LoginField::Email,
            sign_up: false,
            message: None,
        }
    }
}

impl LoginState {
    fn buffer_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.buffer_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.buffer_mut().pop();
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }
}

/// Light or dark palette, persisted in the preferences file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
}

/// Cursor position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub category: Category,
    pub index: usize,
}

/// A task picked up with the keyboard, and where it would land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grab {
    pub id: TaskId,
    pub from: Selection,
    pub target: DropTarget,
}

pub struct App<S> {
    pub board: Board<S>,
    pub identity: Arc<dyn IdentityProvider>,
    pub user: Option<User>,
    pub screen: Screen,
    pub login: LoginState,
    pub selected: Selection,
    pub grab: Option<Grab>,
    pub theme: Theme,
    /// Set when the board must be fetched before the next frame settles.
    pub needs_load: bool,
}

impl<S: TaskStore> App<S> {
    pub fn new(board: Board<S>, identity: Arc<dyn IdentityProvider>, prefs: Prefs) -> Self {
        let mut app = App {
            board,
            identity,
            user: None,
            screen: Screen::Login,
            login: LoginState::default(),
            selected: Selection {
                category: Category::Todo,
                index: 0,
            },
            grab: None,
            theme: Theme {
                dark: prefs.dark_mode,
            },
            needs_load: false,
        };
        let user = app.identity.current_user();
        app.set_user(user);
        app
    }

    /// Reacts to a session change: a user gets the board, no user gets the
    /// login screen.
    pub fn set_user(&mut self, user: Option<User>) {
        let signed_in = user.is_some();
        let was_signed_in = self.user.is_some();
        self.user = user;
        if signed_in {
            self.screen = Screen::Board;
            if !was_signed_in {
                self.login = LoginState::default();
                self.needs_load = true;
            }
        } else {
            self.screen = Screen::Login;
            self.grab = None;
            self.board.form_mut().cancel();
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.board
            .tasks()
            .column(self.selected.category)
            .get(self.selected.index)
    }

    /// Keeps the cursor on an existing row after the board changed.
    pub fn clamp_selection(&mut self) {
        let len = self.board.tasks().column(self.selected.category).len();
        self.selected.index = self.selected.index.min(len.saturating_sub(1));
    }

    /// Puts the cursor on `id`, wherever it is now.
    fn follow(&mut self, id: &TaskId) {
        if let Some((category, index)) = self.board.tasks().locate(id) {
            self.selected = Selection { category, index };
        } else {
            self.clamp_selection();
        }
    }

    /// Selects the next task in the current column.
    pub fn next(&mut self) {
        let len = self.board.tasks().column(self.selected.category).len();
        if len == 0 {
            return;
        }
        self.selected.index = if self.selected.index >= len - 1 { 0 } else { self.selected.index + 1 };
    }

    /// Selects the previous task in the current column.
    pub fn previous(&mut self) {
        let len = self.board.tasks().column(self.selected.category).len();
        if len == 0 {
            return;
        }
        self.selected.index = if self.selected.index == 0 { len - 1 } else { self.selected.index - 1 };
    }

    pub fn next_column(&mut self) {
        self.selected.category = self.selected.category.next();
        self.clamp_selection();
    }

    pub fn previous_column(&mut self) {
        self.selected.category = self.selected.category.previous();
        self.clamp_selection();
    }

    /// Opens the form with an empty draft.
    pub fn start_add(&mut self) {
        self.board.form_mut().open_create();
    }

    /// Opens the form on the selected task.
    pub fn start_edit(&mut self) {
        if let Some(task) = self.selected_task().cloned() {
            self.board.form_mut().open_edit(&task);
        }
    }

    /// Picks up the selected task.
    pub fn start_grab(&mut self) {
        if let Some(task) = self.selected_task() {
            self.grab = Some(Grab {
                id: task.id.clone(),
                from: self.selected,
                target: DropTarget {
                    category: self.selected.category,
                    index: self.selected.index,
                },
            });
        }
    }

    /// Highest index a drop into `category` can use.
    fn max_drop_index(&self, grab: &Grab, category: Category) -> usize {
        let len = self.board.tasks().column(category).len();
        if category == grab.from.category {
            len.saturating_sub(1)
        } else {
            len
        }
    }

    /// Moves the drop marker by `columns` left/right and `rows` up/down.
    pub fn move_grab(&mut self, columns: i32, rows: i32) {
        let Some(mut grab) = self.grab.take() else {
            return;
        };
        let mut category = grab.target.category;
        for _ in 0..columns.unsigned_abs() {
            category = if columns > 0 { category.next() } else { category.previous() };
        }
        let max = self.max_drop_index(&grab, category);
        let index = if rows < 0 {
            grab.target.index.saturating_sub(rows.unsigned_abs() as usize)
        } else {
            grab.target.index + rows as usize
        };
        grab.target = DropTarget {
            category,
            index: index.min(max),
        };
        self.grab = Some(grab);
    }

    /// Drops the grabbed task on the marker and applies the move locally.
    ///
    /// Returns the write to persist; `None` if nothing was grabbed or the
    /// drag was rejected (the error lands in the status line).
    pub fn drop_grabbed(&mut self) -> Option<PendingWrite> {
        let grab = self.grab.take()?;
        let event = DragEnd {
            active_id: grab.id.clone(),
            active_category: grab.from.category,
            active_index: grab.from.index,
            over: Some(grab.target),
        };
        self.finish_drag(&grab.id, &event)
    }

    /// Releases the grabbed task outside the board: nothing changes.
    pub fn cancel_grab(&mut self) -> Option<PendingWrite> {
        let grab = self.grab.take()?;
        let event = DragEnd::new(grab.id.clone(), grab.from.category, grab.from.index);
        self.finish_drag(&grab.id, &event)
    }

    fn finish_drag(&mut self, id: &TaskId, event: &DragEnd) -> Option<PendingWrite> {
        match self.board.begin_drag(event) {
            Ok(pending) => {
                self.follow(id);
                pending
            }
            Err(e) => {
                warn!("Rejected drag of {}: {}", id, e);
                None
            }
        }
    }

    /// Removes the selected task locally; returns the delete to persist.
    pub fn begin_delete_selected(&mut self) -> Option<PendingWrite> {
        let id = self.selected_task()?.id.clone();
        let pending = self.board.begin_delete(&id);
        self.clamp_selection();
        Some(pending)
    }

    /// Sends a pending write. Failures are reported through the board's
    /// status notice.
    pub async fn commit(&mut self, pending: PendingWrite) {
        let _ = self.board.commit(pending).await;
        self.clamp_selection();
    }

    pub async fn submit_form(&mut self) {
        if let Ok(task) = self.board.submit_form().await {
            self.follow(&task.id);
        }
    }

    pub async fn refresh(&mut self) {
        self.needs_load = false;
        let _ = self.board.load().await;
        self.clamp_selection();
    }

    pub fn toggle_theme(&mut self) {
        self.theme.dark = !self.theme.dark;
        if let Err(e) = save_prefs(&Prefs {
            dark_mode: self.theme.dark,
        }) {
            warn!("Failed to save preferences: {}", e);
        }
    }

    /// Signs in (or up) with the typed credentials.
    ///
    /// The screen switches once the session observer reports the user.
    pub async fn submit_login(&mut self) {
        let result = if self.login.sign_up {
            self.identity.sign_up(&self.login.email, &self.login.password).await
        } else {
            self.identity.sign_in(&self.login.email, &self.login.password).await
        };
        if let Err(e) = result {
            self.login.message = Some(e.to_string());
            self.login.password.clear();
        }
    }

    pub async fn federated_login(&mut self) {
        if let Err(e) = self.identity.sign_in_with_federated_provider().await {
            self.login.message = Some(e.to_string());
        }
    }

    pub async fn request_password_reset(&mut self) {
        if self.login.email.trim().is_empty() {
            self.login.message = Some("Please enter a valid email".to_string());
            return;
        }
        self.login.message = Some(match self.identity.send_password_reset(&self.login.email).await {
            Ok(()) => "Password reset email is sent to your email address".to_string(),
            Err(e) => e.to_string(),
        });
    }

    pub async fn sign_out(&mut self) {
        if let Err(e) = self.identity.sign_out().await {
            warn!("Failed to sign out: {}", e);
        }
    }

    /// Text for the status line, if any.
    pub fn status(&self) -> Option<(&str, bool)> {
        match self.board.notice()? {
            Notice::Info(m) => Some((m.as_str(), false)),
            Notice::Error(m) => Some((m.as_str(), true)),
        }
    }
}
