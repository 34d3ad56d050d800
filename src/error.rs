//! Application error carrying a process exit code.
//!
//! Exit codes:
//! - 2: bad input or usage (unreadable CSV, invalid rows, bad flags)
//! - 3: nothing to show (empty series)
//! - 4: runtime failure (terminal, overflow, I/O on outputs)

use crate::pipeline::PipelineError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match err {
            PipelineError::InvalidInput(_) => 2,
            PipelineError::EmptySeries => 3,
            PipelineError::CountOverflow { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_exit_codes() {
        let invalid: AppError = PipelineError::InvalidInput("bad row".to_string()).into();
        assert_eq!(invalid.exit_code(), 2);
        assert!(invalid.message().contains("bad row"));

        let empty: AppError = PipelineError::EmptySeries.into();
        assert_eq!(empty.exit_code(), 3);
    }
}
