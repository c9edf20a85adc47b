//! Error types.
//!
//! - `SalesError` is the library error: every generator, statistic, chart and
//!   IO operation returns it.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

use crate::domain::Column;

/// Errors raised by the analysis library.
#[derive(Error, Debug)]
pub enum SalesError {
    /// Generator or analysis parameters are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Not enough records for the requested statistic.
    #[error("Insufficient data: need at least {needed} record(s), got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    /// The table does not carry a column the operation needs.
    #[error("Missing field: `{0}`")]
    MissingField(Column),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A chart backend failed while drawing.
    #[error("Render error: {0}")]
    Render(String),
}

impl SalesError {
    pub fn insufficient(needed: usize, actual: usize) -> Self {
        Self::InsufficientData { needed, actual }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, SalesError>;

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
}

impl From<SalesError> for AppError {
    fn from(err: SalesError) -> Self {
        let exit_code = match &err {
            SalesError::InvalidConfiguration(_)
            | SalesError::Io(_)
            | SalesError::Csv(_)
            | SalesError::Json(_) => 2,
            SalesError::InsufficientData { .. } | SalesError::MissingField(_) => 3,
            SalesError::Render(_) => 4,
        };
        Self::new(exit_code, err.to_string())
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
