//! Error types for the cleaning pipeline

use thiserror::Error;

/// Pipeline errors, one variant per failing stage
#[derive(Error, Debug)]
pub enum Error {
    /// Input unreadable, unparseable or not valid UTF-8
    #[error("Load error: {0}")]
    Load(#[source] fastclean_formats::Error),

    /// An expected column is missing from the loaded table
    #[error("Schema error: {0}")]
    Schema(String),

    /// Output destination could not be written
    #[error("Write error: {0}")]
    Write(#[source] fastclean_formats::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
