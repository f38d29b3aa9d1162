use std::path::PathBuf;

use thiserror::Error;

/// Broad grouping used by the UI to pick a dialog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Precondition,
    Storage,
}

#[derive(Error, Debug)]
pub enum DropError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("\"{ch}\" cannot be used in the {field}")]
    ForbiddenChar { field: &'static str, ch: char },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("there are no points to record")]
    NoPoints,

    #[error("too many points ({0}); record one team per round at a time")]
    TooManyPoints(usize),

    #[error("invalid round: {0}")]
    InvalidRound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("map directory {} is missing or empty; put map images into it", .0.display())]
    MapsMissing(PathBuf),

    #[error("there is no staged data to commit")]
    NoStagedData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl DropError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DropError::EmptyField { .. }
            | DropError::ForbiddenChar { .. }
            | DropError::InvalidDate(_)
            | DropError::NoPoints
            | DropError::TooManyPoints(_)
            | DropError::InvalidRound(_)
            | DropError::InvalidInput(_) => ErrorCategory::Validation,
            DropError::Conflict(_) => ErrorCategory::Conflict,
            DropError::NotFound(_) => ErrorCategory::NotFound,
            DropError::MapsMissing(_) | DropError::NoStagedData => ErrorCategory::Precondition,
            DropError::Io(_) | DropError::Decode { .. } => ErrorCategory::Storage,
        }
    }
}

pub type DropResult<T> = Result<T, DropError>;
