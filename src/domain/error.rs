//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent codec violations.
/// These are independent of file and console concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid encoding: {reason}")]
    InvalidEncoding { position: usize, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed bitstream: no branch for bit {position} ({decoded} characters decoded)")]
    MalformedBitstream { position: usize, decoded: usize },

    #[error("invalid bit {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },

    #[error("trailing bits: path starting at bit {position} ends before a leaf ({decoded} characters decoded)")]
    TrailingBits { position: usize, decoded: usize },

    #[error("symbol {0:?} has no code in this tree")]
    UnknownSymbol(char),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub(crate) fn encoding(position: usize, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            position,
            reason: reason.into(),
        }
    }
}
