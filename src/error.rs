//! Error types.
//!
//! - `AppError` is what the binary sees: a message plus the process exit code.
//! - `DataError` is the pipeline taxonomy (lifecycle, configuration, load).
//!
//! Missing values inside otherwise valid data are never errors; they are
//! absorbed by the per-metric substitution policy in `domain`.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::SourceKind;

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

/// Failures surfaced by the data pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// The dataset was read before the load completed.
    #[error("Dataset is not ready yet; wait for the load to complete.")]
    NotReady,

    /// `DataHandle::complete` was called a second time.
    #[error("Dataset was already loaded for this session.")]
    AlreadyLoaded,

    #[error("Custom period requires both a start and an end date.")]
    IncompleteCustomRange,

    #[error(
        "Unknown period '{0}'. Expected last7days, last15days, last30days, lastMonth, all-time, custom or a 4-digit year."
    )]
    UnknownPeriod(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD or MM-DD-YYYY.")]
    InvalidDate(String),

    #[error("Failed to load {source_kind} data from '{}': {message}", .path.display())]
    Load {
        source_kind: SourceKind,
        path: PathBuf,
        message: String,
    },
}

impl DataError {
    pub fn exit_code(&self) -> u8 {
        match self {
            DataError::IncompleteCustomRange | DataError::UnknownPeriod(_) | DataError::InvalidDate(_) => 2,
            DataError::Load { .. } => 4,
            DataError::NotReady | DataError::AlreadyLoaded => 5,
        }
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_map_to_exit_codes() {
        let err: AppError = DataError::IncompleteCustomRange.into();
        assert_eq!(err.exit_code(), 2);

        let err: AppError = DataError::NotReady.into();
        assert_eq!(err.exit_code(), 5);

        let err: AppError = DataError::Load {
            source_kind: SourceKind::Gdp,
            path: PathBuf::from("data/gdp.csv"),
            message: "No such file".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("data/gdp.csv"));
    }
}
