//! Error types for temporal value construction, decoding and index glue.

use tempus_types::error::TypesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TempusError {
    /// Overlapping or invalidly adjacent sequences, no sequences at all, or
    /// sequences with different interpolations.
    #[error("Invalid sequence set: {0}")]
    InvalidSequenceSet(String),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Invalid instant set: {0}")]
    InvalidInstantSet(String),

    /// Box based query on a value type without a numeric bounding box.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Unrecognized operator: {0}")]
    UnrecognizedOperator(String),

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TempusError>;
