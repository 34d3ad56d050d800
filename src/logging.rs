//! `tracing` subscriber setup.
//!
//! Logs go to stderr for the line-oriented commands. The TUI owns the terminal,
//! so there logs are only written when a log file is configured.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Where log lines should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Drop everything unless a file is configured.
    FileOnly,
}

/// Install the global subscriber. Calling it twice keeps the first one.
pub fn init(filter: &str, log_file: Option<&Path>, sink: LogSink) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|e| AppError::new(2, format!("Invalid log filter '{filter}': {e}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false);

    match (log_file, sink) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        (None, LogSink::Stderr) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
        (None, LogSink::FileOnly) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_is_a_usage_error() {
        let err = init("dod=notalevel", None, LogSink::FileOnly).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
