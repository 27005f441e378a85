//! Error types for the STDF renderer.

use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a decoded record stream or rendering it.
#[derive(Debug, Error)]
pub enum Error {
    /// A field value or record type does not agree with the schema registry.
    /// Fatal: the render is aborted.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A row could not be stored in the pivot tables. Caught inside the CSV
    /// encoder, logged, and the row is dropped.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The decoded record stream is malformed (bad JSON line, wrong shape)
    #[error("Invalid record stream: {0}")]
    InvalidInput(String),

    /// A lifecycle call arrived out of order (e.g. `send` before `begin`)
    #[error("Render state error: {0}")]
    State(String),

    /// The CSV report writer failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
