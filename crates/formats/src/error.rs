//! Error types for format readers and writers

use thiserror::Error;

/// Format reader/writer errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Invalid file: {0}")]
    InvalidFile(String),
}

/// Result type alias for format operations
pub type Result<T> = std::result::Result<T, Error>;
