//! Add/edit form state.
//!
//! The form is `Idle` (hidden), `Creating` (draft without id) or `Editing`
//! (draft copied from an existing task). Submitting goes through
//! [`crate::board::Board::submit_form`]; this module only owns the draft and
//! its validation.

use crate::error::ValidationError;
use crate::models::{due_date_format, Category, Task, TaskId, TaskInput, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Idle,
    Creating,
    Editing,
}

/// The draft field that receives typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    DueDate,
    Category,
}

impl FormField {
    const ORDER: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::DueDate,
        FormField::Category,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::DueDate => "Due (YYYY-MM-DD)",
            FormField::Category => "Category",
        }
    }

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> FormField {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn previous(&self) -> FormField {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// A task as typed into the form. Text fields hold raw input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    /// Set only while editing an existing task.
    pub id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub due_date: String,
}

impl Draft {
    pub fn from_task(task: &Task) -> Self {
        Draft {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category,
            due_date: task
                .due_date
                .map(|d| d.format(due_date_format::FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    /// Checks the draft and turns it into a request body.
    pub fn validate(&self, require_description: bool) -> Result<TaskInput, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong { len });
        }

        let description = self.description.trim();
        if require_description && description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong { len });
        }

        let due_date = due_date_format::parse_strict(&self.due_date)
            .map_err(|_| ValidationError::InvalidDueDate(self.due_date.trim().to_string()))?;

        Ok(TaskInput {
            title: title.to_string(),
            description: description.to_string(),
            category: self.category,
            due_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FormState {
    Idle,
    Creating(Draft),
    Editing(Draft),
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    state: FormState,
    focus: FormField,
    error: Option<String>,
    require_description: bool,
}

impl TaskForm {
    pub fn new(require_description: bool) -> Self {
        Self {
            state: FormState::Idle,
            focus: FormField::Title,
            error: None,
            require_description,
        }
    }

    pub fn mode(&self) -> FormMode {
        match self.state {
            FormState::Idle => FormMode::Idle,
            FormState::Creating(_) => FormMode::Creating,
            FormState::Editing(_) => FormMode::Editing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode() != FormMode::Idle
    }

    pub fn require_description(&self) -> bool {
        self.require_description
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            FormState::Idle => None,
            FormState::Creating(d) | FormState::Editing(d) => Some(d),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.state {
            FormState::Idle => None,
            FormState::Creating(d) | FormState::Editing(d) => Some(d),
        }
    }

    /// Opens an empty draft. The category defaults to To-Do.
    pub fn open_create(&mut self) {
        self.open(FormState::Creating(Draft::default()));
    }

    /// Opens a draft copied from `task`, replacing any open draft.
    pub fn open_edit(&mut self, task: &Task) {
        self.open(FormState::Editing(Draft::from_task(task)));
    }

    fn open(&mut self, state: FormState) {
        self.state = state;
        self.focus = FormField::Title;
        self.error = None;
    }

    /// Discards the draft.
    pub fn cancel(&mut self) {
        self.open(FormState::Idle);
    }

    /// Checks the open draft.
    pub fn validate(&self) -> Result<TaskInput, ValidationError> {
        self.draft()
            .ok_or(ValidationError::NoDraft)?
            .validate(self.require_description)
    }

    /// Last submit error, shown under the form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn previous_field(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Types a character into the focused text field.
    pub fn push_char(&mut self, c: char) {
        let focus = self.focus;
        if let Some(field) = self.draft_mut().and_then(|d| text_field(d, focus)) {
            field.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        let focus = self.focus;
        if let Some(field) = self.draft_mut().and_then(|d| text_field(d, focus)) {
            field.pop();
        }
    }

    /// Steps the draft's category left or right.
    pub fn cycle_category(&mut self, forward: bool) {
        if let Some(draft) = self.draft_mut() {
            draft.category = if forward {
                draft.category.next()
            } else {
                draft.category.previous()
            };
        }
    }
}

fn text_field(draft: &mut Draft, field: FormField) -> Option<&mut String> {
    match field {
        FormField::Title => Some(&mut draft.title),
        FormField::Description => Some(&mut draft.description),
        FormField::DueDate => Some(&mut draft.due_date),
        FormField::Category => None,
    }
}
