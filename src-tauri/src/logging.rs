//! Logging setup
//!
//! Console output plus a daily rolling log file in the per-user data
//! directory. Release builds have no console, so the file is the only
//! record of caught failures.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{APP_IDENTIFIER, DEFAULT_LOG_FILTER, LOG_DIR_ENV, LOG_FILE_NAME};

/// Keeps the file writer alive until [`shutdown`]
static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Log directory. Priority: FLOATPET_LOG_DIR env var > <local data dir>/<identifier>/logs
pub fn log_dir() -> PathBuf {
    resolve_log_dir(std::env::var_os(LOG_DIR_ENV))
}

fn resolve_log_dir(custom: Option<OsString>) -> PathBuf {
    match custom {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_IDENTIFIER)
            .join("logs"),
    }
}

fn file_writer(dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_NAME)
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
/// Falls back to console-only logging when the log directory is unusable.
pub fn init() {
    let dir = log_dir();
    let (file_layer, failure) = match file_writer(&dir) {
        Ok((writer, guard)) => {
            *LOG_GUARD.lock().unwrap_or_else(|e| e.into_inner()) = Some(guard);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), None)
        }
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer())
        .with(file_layer)
        .init();

    match failure {
        None => tracing::info!("Logging to {}", dir.display()),
        Some(e) => tracing::warn!("File logging disabled for {}: {:#}", dir.display(), e),
    }
}

/// Flush and close the log file. Call before the process exits.
pub fn shutdown() {
    drop(LOG_GUARD.lock().unwrap_or_else(|e| e.into_inner()).take());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_custom_log_dir_wins() {
        let dir = resolve_log_dir(Some(OsString::from("/tmp/floatpet-logs")));
        assert_eq!(dir, PathBuf::from("/tmp/floatpet-logs"));
    }

    #[test]
    fn test_default_log_dir_is_per_app() {
        let dir = resolve_log_dir(None);
        assert!(dir.ends_with(Path::new(APP_IDENTIFIER).join("logs")));

        assert_eq!(resolve_log_dir(Some(OsString::new())), dir);
    }

    #[test]
    fn test_file_writer_persists_events() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        let (writer, guard) = file_writer(&logs).unwrap();

        let subscriber =
            tracing_subscriber::registry().with(fmt::layer().with_writer(writer).with_ansi(false));
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("Failed to open bubble 7: window creation failed");
        });
        drop(guard);

        let contents: String = std::fs::read_dir(&logs)
            .unwrap()
            .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
            .collect();
        assert!(contents.contains("ERROR"));
        assert!(contents.contains("Failed to open bubble 7"));
    }
}
