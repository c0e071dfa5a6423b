//! Error types.
//!
//! - `PipelineError`: typed failures of the risk pipeline (what went wrong)
//! - `AppError`: what the binary reports (message + process exit code)
//!
//! Exit codes:
//! - `2`: bad input (missing columns, unreadable CSV, bad arguments)
//! - `3`: input parsed but no usable rows remain
//! - `4`: runtime/terminal/export failure

use thiserror::Error;

/// One or more required columns are absent from the CSV header.
///
/// `missing` lists the absent names in canonical order (`age`, `income`,
/// `loan_amount`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required columns: {}", .missing.join(", "))]
pub struct MissingColumnsError {
    pub missing: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    MissingColumns(#[from] MissingColumnsError),

    #[error("Failed to parse CSV: {0}")]
    Parse(String),

    #[error("No valid borrower rows remain after parsing ({rows_read} read).")]
    NoValidRows { rows_read: usize },

    #[error("Borrower index {index} is out of range (dataset has {len} rows).")]
    BorrowerIndexOutOfRange { index: usize, len: usize },
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::MissingColumns(_)
            | PipelineError::Parse(_)
            | PipelineError::BorrowerIndexOutOfRange { .. } => 2,
            PipelineError::NoValidRows { .. } => 3,
        }
    }
}

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
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl From<MissingColumnsError> for AppError {
    fn from(err: MissingColumnsError) -> Self {
        PipelineError::from(err).into()
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
    fn missing_columns_message_lists_names() {
        let err = MissingColumnsError {
            missing: vec!["income".to_string(), "loan_amount".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required columns: income, loan_amount");

        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
    }

    #[test]
    fn no_valid_rows_maps_to_exit_code_3() {
        let app: AppError = PipelineError::NoValidRows { rows_read: 4 }.into();
        assert_eq!(app.exit_code(), 3);
    }
}
