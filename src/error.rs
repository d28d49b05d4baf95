//! Error types for the settlement engine and its input readers.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading inputs or writing reports.
///
/// The settlement computation itself is total and never fails.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Trip metadata was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A single input row failed validation
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Trip metadata had an unexpected shape
    #[error("Invalid trip metadata: {0}")]
    InvalidMetadata(String),

    /// Missing command line arguments
    #[error(
        "Missing input file argument. Usage: trip-settlement <travelers.csv|trip.json> <expenses.csv> [status.csv]"
    )]
    MissingArgument,
}
