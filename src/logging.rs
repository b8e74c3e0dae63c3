use std::fs;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

use crate::error::{ClawError, Result};

pub const DEFAULT_LOG_DIR: &str = "data";
const LOG_FILE_PREFIX: &str = "trustclaw";
const LOG_FILE_SUFFIX: &str = "log";
/// One file per day, so a week of history.
const RETAINED_LOG_FILES: usize = 7;

/// Daily-rotated `trustclaw.*.log` writer under `dir`, creating `dir` first.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(RETAINED_LOG_FILES)
        .build(dir)
        .map_err(|e| ClawError::logging_error(format!("log file in {}: {}", dir.display(), e)))
}

/// Installs the global subscriber: INFO (DEBUG when `verbose`) on stderr plus
/// this crate's DEBUG output in the log file. Keep the guard alive for the
/// life of the process or buffered file lines are lost.
pub fn init(dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);

    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let file_filter = Targets::new()
        .with_target(env!("CARGO_CRATE_NAME"), Level::DEBUG)
        .with_default(Level::INFO);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_level),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .try_init()
        .map_err(|e| ClawError::logging_error(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_appender_creates_directory_and_file() {
        let root = std::env::temp_dir().join(format!("trustclaw-logs-{}", std::process::id()));
        let dir = root.join("nested").join("data");
        let _ = fs::remove_dir_all(&root);

        let mut appender = file_appender(&dir).unwrap();
        appender.write_all(b"hello from the log file\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("trustclaw."));
        assert!(names[0].ends_with(".log"));

        let contents = fs::read_to_string(dir.join(&names[0])).unwrap();
        assert!(contents.contains("hello from the log file"));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_file_appender_rejects_a_file_path() {
        let path = std::env::temp_dir().join(format!("trustclaw-not-a-dir-{}", std::process::id()));
        fs::write(&path, b"x").unwrap();
        assert!(file_appender(&path).is_err());
        fs::remove_file(&path).unwrap();
    }
}
