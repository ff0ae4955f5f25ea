use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of characters allowed in a task title.
pub const MAX_TITLE_LEN: usize = 50;
/// Maximum number of characters allowed in a task description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Opaque task identifier assigned by the persistence backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        TaskId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

/// One of the three fixed board columns.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[default]
    #[serde(rename = "To-Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl Category {
    /// All categories in board order (left to right).
    pub const ALL: [Category; 3] = [Category::Todo, Category::InProgress, Category::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Todo => "To-Do",
            Category::InProgress => "In Progress",
            Category::Done => "Done",
        }
    }

    /// Position of the column on the board.
    pub fn index(&self) -> usize {
        match self {
            Category::Todo => 0,
            Category::InProgress => 1,
            Category::Done => 2,
        }
    }

    /// The column to the right, wrapping around.
    pub fn next(&self) -> Category {
        Category::ALL[(self.index() + 1) % Category::ALL.len()]
    }

    /// The column to the left, wrapping around.
    pub fn previous(&self) -> Category {
        Category::ALL[(self.index() + Category::ALL.len() - 1) % Category::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "todo" => Ok(Category::Todo),
            "inprogress" | "doing" => Ok(Category::InProgress),
            "done" => Ok(Category::Done),
            _ => Err(format!(
                "unknown category '{}'. Use To-Do, In Progress or Done.",
                s
            )),
        }
    }
}

/// A task as stored by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Backend-assigned identifier; immutable after creation.
    #[serde(rename = "_id", alias = "id")]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    /// `None` means the task has no due date.
    #[serde(
        rename = "dueDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "due_date_format"
    )]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Applies every field present in `patch`, leaving the id untouched.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(due) = patch.due_date {
            self.due_date = due;
        }
    }

    /// Builds a backend record from an input and a freshly assigned id.
    pub fn from_input(id: TaskId, input: TaskInput) -> Self {
        Task {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            due_date: input.due_date,
        }
    }
}

/// Body of a create or full update request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(rename = "dueDate", default, with = "due_date_format")]
    pub due_date: Option<NaiveDate>,
}

/// A partial update. Unset fields are left as they are on the backend.
///
/// `due_date` is doubly optional: `Some(None)` clears the due date.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(
        rename = "dueDate",
        skip_serializing_if = "Option::is_none",
        serialize_with = "due_date_format::serialize_patch"
    )]
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// A patch that only changes the category.
    pub fn category(category: Category) -> Self {
        TaskPatch {
            category: Some(category),
            ..TaskPatch::default()
        }
    }

    /// True when every field is set, i.e. the patch is a full replacement.
    pub fn is_full(&self) -> bool {
        self.title.is_some()
            && self.description.is_some()
            && self.category.is_some()
            && self.due_date.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
    }

    /// Converts a full patch back into a request body.
    pub fn to_input(&self) -> Option<TaskInput> {
        Some(TaskInput {
            title: self.title.clone()?,
            description: self.description.clone()?,
            category: self.category?,
            due_date: self.due_date?,
        })
    }
}

impl From<TaskInput> for TaskPatch {
    fn from(input: TaskInput) -> Self {
        TaskPatch {
            title: Some(input.title),
            description: Some(input.description),
            category: Some(input.category),
            due_date: Some(input.due_date),
        }
    }
}

/// Wire format for `dueDate`.
///
/// The backend stores whatever the date input produced: `"YYYY-MM-DD"`, an
/// empty string, `null`, or occasionally a full ISO timestamp.
pub mod due_date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    /// Parses a due date the way the backend may have stored it.
    pub fn parse(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let date_part = raw.split('T').next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, FORMAT).map(Some)
    }

    /// Parses typed input: blank or exactly `YYYY-MM-DD`.
    pub fn parse_strict(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, FORMAT).map(Some)
    }

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn serialize_patch<S>(
        date: &Option<Option<NaiveDate>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(inner) => serialize(inner, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) => parse(&s).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
