//! Tracing subscriber setup for applications embedding the engine.
//!
//! The engine itself only emits `tracing` events; this module wires them to a
//! log file (or stderr) the way a host application typically wants.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Wall-clock timestamp formatter for log lines.
struct CatalogTimer;

impl tracing_subscriber::fmt::time::FormatTime for CatalogTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// Keeps the non-blocking writer flushing for the life of the process.
static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// `RUST_LOG` when set, `info` otherwise.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// What: Install a global tracing subscriber.
///
/// Inputs:
/// - `log_path`: File to append to; `None` logs to stderr.
///
/// Output:
/// - `true` when this call installed the subscriber, `false` when one was already set.
///
/// Details:
/// - Falls back to stderr (with a warning) when the file cannot be opened.
/// - Never panics when a subscriber is already installed.
pub fn init(log_path: Option<&Path>) -> bool {
    let file = log_path.map(|p| {
        (
            p,
            std::fs::OpenOptions::new().create(true).append(true).open(p),
        )
    });
    match file {
        Some((path, Ok(file))) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let installed = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(CatalogTimer)
                .try_init()
                .is_ok();
            if installed {
                let _ = LOG_GUARD.set(guard);
                tracing::info!(path = %path.display(), "logging initialized");
            }
            installed
        }
        other => {
            let installed = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(CatalogTimer)
                .try_init()
                .is_ok();
            if installed && let Some((path, Err(e))) = other {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to open log file; using stderr"
                );
            }
            installed
        }
    }
}
