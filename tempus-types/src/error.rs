use thiserror::Error;

/// Errors raised when constructing time and value primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypesError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid period set: {0}")]
    InvalidPeriodSet(String),

    #[error("Invalid timestamp set: {0}")]
    InvalidTimestampSet(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A strict union was requested for two ranges that neither overlap nor touch.
    #[error("Result of range union would not be contiguous")]
    NonContiguousUnion,
}

pub type Result<T> = std::result::Result<T, TypesError>;
