use salesboard_domain::DateRangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Unknown business unit: {0}")]
    UnknownBusinessUnit(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Preset `{preset}` is not available for the {granularity} view")]
    UnsupportedPreset { preset: String, granularity: String },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Pagination aborted at offset {offset} after {fetched} rows: {reason}")]
    PaginationAborted {
        offset: usize,
        fetched: usize,
        reason: String,
    },
    #[error("Operation cancelled")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<DateRangeError> for CoreError {
    fn from(err: DateRangeError) -> Self {
        CoreError::InvalidRange(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}

impl From<salesboard_config::ConfigError> for CoreError {
    fn from(err: salesboard_config::ConfigError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
