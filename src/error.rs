//! Error types for the summary uploader.
//!
//! Validation problems are session-level and never touch a record; every
//! other variant ends up as the error message of exactly one record.

use thiserror::Error;

/// Rejections raised while the user is picking files.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Maximum {0} files allowed")]
    TooManyFiles(usize),

    #[error("Only PDF and TXT files are allowed")]
    UnsupportedType,

    #[error("This file has already been added")]
    Duplicate,

    #[error("No files to upload")]
    NothingToUpload,
}

/// Main error type for the uploader
#[derive(Error, Debug)]
pub enum Error {
    /// Request could not be sent or its body could not be read
    #[error("{0}")]
    Transport(String),

    /// Webhook answered with a non-success status code
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("Empty or invalid summary response")]
    EmptyResponse,

    #[error("Summary generation timed out")]
    PollTimeout,

    #[error("Failed to retrieve summary")]
    PollFailed,

    /// Save requested for a record that has no summary yet
    #[error("No summary available to save")]
    NoSummary,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
