//! Configuration for the taskboard client.
//!
//! Layered with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attributes)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! A missing default config file is not an error. An explicit `--config`
//! path that doesn't exist is.

use std::path::{Path, PathBuf};

use crate::board::BoardOptions;
use crate::reconcile::UpdatePolicy;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    board: BoardFileConfig,
    log: LogFileConfig,
}

/// `[api]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    url: Option<String>,
    offline: Option<bool>,
}

/// `[board]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardFileConfig {
    policy: Option<UpdatePolicy>,
    require_description: Option<bool>,
}

/// `[log]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LogFileConfig {
    level: Option<String>,
    file: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the task service.
    pub api_url: String,
    /// Use the local JSON file instead of the task service.
    pub offline: bool,
    pub policy: UpdatePolicy,
    pub require_description: bool,
    /// Log level filter; `RUST_LOG` still wins when set.
    pub log_level: String,
    /// Log file (default: `$TMPDIR/taskboard.log`).
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            offline: false,
            policy: UpdatePolicy::Optimistic,
            require_description: true,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Loads the config file and merges it under the CLI arguments.
    pub fn load(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(args.config.as_deref())?;
        Ok(Self::resolve(args, &file))
    }

    fn resolve(args: &GlobalArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            api_url: args
                .api_url
                .clone()
                .or_else(|| file.api.url.clone())
                .unwrap_or(defaults.api_url),
            offline: args.offline || file.api.offline.unwrap_or(defaults.offline),
            policy: args.policy.or(file.board.policy).unwrap_or(defaults.policy),
            require_description: !args.allow_empty_description
                && file
                    .board
                    .require_description
                    .unwrap_or(defaults.require_description),
            log_level: args
                .log_level
                .clone()
                .or_else(|| file.log.level.clone())
                .unwrap_or(defaults.log_level),
            log_file: args.log_file.clone().or_else(|| file.log.file.clone()),
        }
    }

    pub fn board_options(&self) -> BoardOptions {
        BoardOptions {
            policy: self.policy,
            require_description: self.require_description,
        }
    }
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Base URL of the task service.
    #[arg(long, global = true, env = "TASKBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Keep tasks in a local JSON file instead of the task service.
    #[arg(long, global = true)]
    pub offline: bool,

    /// What a failed write does to the board: optimistic or rollback.
    #[arg(long, global = true, env = "TASKBOARD_POLICY")]
    pub policy: Option<UpdatePolicy>,

    /// Accept tasks without a description.
    #[arg(long, global = true)]
    pub allow_empty_description: bool,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short = 'C', long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "TASKBOARD_LOG")]
    pub log_level: Option<String>,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskboard").join("config.toml");
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert!(!config.offline);
        assert_eq!(config.policy, UpdatePolicy::Optimistic);
        assert!(config.require_description);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn file_values_fill_in_missing_args() {
        let file: ConfigFile = toml::from_str(
            r#"
[api]
url = "https://tasks.example.com"

[board]
policy = "rollback"
require_description = false

[log]
level = "debug"
"#,
        )
        .unwrap();
        let config = AppConfig::resolve(&GlobalArgs::default(), &file);
        assert_eq!(config.api_url, "https://tasks.example.com");
        assert_eq!(config.policy, UpdatePolicy::Rollback);
        assert!(!config.require_description);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn args_override_file() {
        let file: ConfigFile = toml::from_str("[api]\nurl = \"https://file\"\n").unwrap();
        let args = GlobalArgs {
            api_url: Some("https://cli".into()),
            policy: Some(UpdatePolicy::Rollback),
            allow_empty_description: true,
            ..GlobalArgs::default()
        };
        let config = AppConfig::resolve(&args, &file);
        assert_eq!(config.api_url, "https://cli");
        assert_eq!(config.policy, UpdatePolicy::Rollback);
        assert!(!config.require_description);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let file: ConfigFile = toml::from_str("[log]\nlevel = \"warn\"\n").unwrap();
        let config = AppConfig::resolve(&GlobalArgs::default(), &file);
        assert_eq!(config.api_url, AppConfig::default().api_url);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config_file(Some(Path::new("/nonexistent/taskboard.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
