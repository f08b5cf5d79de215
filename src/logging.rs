use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "KLISIS_LOG";

/// Keeps the background log writer alive; drop it last.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Log to a daily rolling file. The terminal belongs to the TUI, so there is no
/// stdout layer. Returns `None` when the log directory cannot be created.
pub fn init_file_logging(log_dir: &Path, default_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {err}", log_dir.display());
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "klisis.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let initialized = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();
    if initialized.is_err() {
        return None;
    }

    Some(FileLogGuard { _guard: guard })
}
