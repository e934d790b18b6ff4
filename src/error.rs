use std::io;
use thiserror::Error;

/// Error type for sniffing operations.
#[derive(Error, Debug)]
pub enum SniffError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A required argument was missing or invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The character source cannot rewind and a multi-pass scan was requested.
    #[error("Source does not support rewinding")]
    NotSeekable,

    /// Empty input, nothing to analyze.
    #[error("Empty input or no data to analyze")]
    EmptyData,
}

/// Result type alias for sniffing operations.
pub type Result<T> = std::result::Result<T, SniffError>;
