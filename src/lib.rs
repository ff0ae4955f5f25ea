//! # Taskboard
//!
//! A three-column task board (To-Do, In Progress, Done) backed by a REST
//! task service. Taskboard combines a CLI for quick scripted changes with a
//! TUI where tasks are dragged between columns with the keyboard.
//!
//! ## Features
//!
//! *   **Board columns**: Tasks are grouped by category and kept in the
//!     order the backend returns them.
//! *   **Optimistic updates**: Drags, edits and deletes show up immediately
//!     and are persisted in the background. With `--policy rollback` a
//!     failed write is undone.
//! *   **Accounts**: Sign up, sign in, password reset and a federated
//!     sign-in. The board is only reachable while signed in.
//! *   **Offline mode**: `--offline` keeps tasks in a local JSON file.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! taskboard
//! # or explicitly
//! taskboard ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! **Board**
//! *   `←/→`, `↑/↓`: Select column and task
//! *   `m`: Grab the selected task; arrows move the drop marker, `Enter`
//!     drops, `Esc` puts it back
//! *   `a`: Add task, `e`: Edit task, `d`: Delete task
//! *   `r`: Reload from the backend
//! *   `t`: Toggle light/dark theme
//! *   `o`: Sign out
//! *   `q`: Quit
//!
//! **Form**
//! *   `Tab`: Next field, `←/→`: Change category, `Enter`: Save, `Esc`: Cancel
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! taskboard signup me@example.com secret
//! taskboard add "Write report" -d "Quarterly numbers" --due 2025-12-01
//! taskboard list
//! taskboard move <ID> done
//! taskboard reorder todo 2 0
//! ```
//!
//! ## Configuration
//!
//! `~/.config/taskboard/config.toml`, overridden by `TASKBOARD_*`
//! environment variables and command-line flags. See [`config`].
//!
//! ## Data Storage
//!
//! Accounts, the session and preferences live in the local data directory
//! (`~/.local/share/taskboard` on Linux). In offline mode tasks are stored in
//! `tasks.json` there, or wherever `TASKS_DB` points.

pub mod auth;
pub mod board;
pub mod collection;
pub mod commands;
pub mod config;
pub mod due;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod storage;
pub mod store;
pub mod tui;
