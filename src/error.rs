//! Error types for board operations.

use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::models::{Category, TaskId, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

/// A draft that cannot be submitted. Raised before any store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Title is {len} characters long; the limit is {}", MAX_TITLE_LEN)]
    TitleTooLong { len: usize },

    #[error("Description is required")]
    EmptyDescription,

    #[error("Description is {len} characters long; the limit is {}", MAX_DESCRIPTION_LEN)]
    DescriptionTooLong { len: usize },

    #[error("Invalid due date '{0}'. Use YYYY-MM-DD.")]
    InvalidDueDate(String),

    /// Submit was requested while no form is open.
    #[error("No task form is open")]
    NoDraft,
}

/// Failure talking to the task backend.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed task data: {0}")]
    Json(#[from] serde_json::Error),

    /// The store was told to fail (in-process backend only).
    #[error("Simulated backend failure")]
    Simulated,
}

/// Errors surfaced by the board core.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Task {id} not found")]
    NotFound { id: TaskId },

    /// Collection misuse: an index outside the current sequence.
    #[error("Index {index} is out of range for {category} ({len} tasks)")]
    IndexOutOfRange {
        category: Category,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BoardError {
    pub fn not_found(id: &TaskId) -> Self {
        BoardError::NotFound { id: id.clone() }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, BoardError::Transport(_))
    }
}

impl From<reqwest::Error> for BoardError {
    fn from(e: reqwest::Error) -> Self {
        BoardError::Transport(TransportError::Http(e))
    }
}

impl From<std::io::Error> for BoardError {
    fn from(e: std::io::Error) -> Self {
        BoardError::Transport(TransportError::Io(e))
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(e: serde_json::Error) -> Self {
        BoardError::Transport(TransportError::Json(e))
    }
}

/// Result type for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;
