use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Returns the directory holding taskboard's local files.
///
/// The directory is determined in the following order:
/// 1. The parent of the `TASKS_DB` environment variable, if set.
/// 2. `~/.local/share/taskboard/` (on Linux).
/// 3. `./` (fallback).
pub fn data_dir() -> PathBuf {
    let mut p = tasks_path();
    p.pop();
    p
}

/// Returns the path to the offline tasks database file (`tasks.json`).
///
/// `TASKS_DB` overrides the location.
pub fn tasks_path() -> PathBuf {
    std::env::var("TASKS_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("taskboard");
        p.push("tasks.json");
        p
    })
}

/// Returns the path to the local accounts file (`accounts.json`).
pub fn accounts_path() -> PathBuf {
    data_dir().join("accounts.json")
}

/// Returns the path to the persisted session file (`session.json`).
pub fn session_path() -> PathBuf {
    data_dir().join("session.json")
}

/// Returns the path to the UI preferences file (`prefs.json`).
pub fn prefs_path() -> PathBuf {
    data_dir().join("prefs.json")
}

/// Reads a JSON document, returning `None` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}

/// Writes a JSON document, creating parent directories as needed.
///
/// The document goes to a sibling `.tmp` file first and is renamed over
/// `path`, so a failed write leaves the previous file intact.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let s = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let tmp = temp_path(path);
    let written = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)
        .and_then(|mut f| {
            f.write_all(s.as_bytes())?;
            f.sync_all()
        });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)
}

/// Sibling path used while a document is being written.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Removes a file if it exists.
pub fn remove_file(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Persisted UI preferences.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefs {
    #[serde(default)]
    pub dark_mode: bool,
}

/// Loads preferences; unreadable or missing files yield the defaults.
pub fn load_prefs() -> Prefs {
    match read_json(&prefs_path()) {
        Ok(Some(p)) => p,
        Ok(None) => Prefs::default(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable preferences: {}", e);
            Prefs::default()
        }
    }
}

pub fn save_prefs(prefs: &Prefs) -> io::Result<()> {
    write_json(&prefs_path(), prefs)
}
