use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

/// Initialize file-based logging.
///
/// Logs go to a file, never stdout, since the board UI owns the terminal.
/// `RUST_LOG` takes precedence over `level`. The returned guard must be held
/// until shutdown so buffered entries are flushed.
pub fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let installed = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .try_init()
        .is_ok();

    installed.then_some(guard)
}
