use thiserror::Error;

use crate::buffer::BufferFull;

/// Errors raised by [`serialize`](crate::serialize), [`deserialize`](crate::deserialize)
/// and the producer-side collection API.
#[derive(Debug, Error)]
pub enum SerdesError {
    /// A required argument was absent. Raised before any I/O takes place.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The input bytes do not match the wire layout.
    #[error("malformed input: {0}")]
    Format(#[from] FormatError),

    /// A count or string length does not fit its wire field.
    #[error("{field} of {len} exceeds wire maximum {max}")]
    Overflow {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error(transparent)]
    BufferFull(#[from] BufferFull),

    #[error("input exceeds {limit} byte limit")]
    InputTooLarge { limit: usize },

    /// A numeric iterator for this series is already present in the group.
    #[error("group {group} already holds a numeric iterator for {series}")]
    DuplicateIterator { group: String, series: String },

    #[error("entry for {0} has no numeric iterator")]
    MissingNumeric(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SerdesError {
    /// Returns `true` for caller-programming errors (absent arguments).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SerdesError::InvalidArgument(_))
    }

    /// Returns `true` when the input bytes were malformed.
    pub fn is_format(&self) -> bool {
        matches!(self, SerdesError::Format(_))
    }
}

/// Ways an encoded payload can fail to match the wire layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unexpected end of input: needed {needed} bytes at offset {offset}")]
    UnexpectedEnd { needed: usize, offset: usize },

    #[error("unknown value type tag {0}")]
    UnknownTypeTag(u8),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("series id carries no metric names")]
    EmptyMetrics,

    #[error("series id repeats tag key {key}")]
    DuplicateTag { key: String },

    #[error("group {0} appears more than once")]
    DuplicateGroup(String),

    #[error("group {group} holds series {series} more than once")]
    DuplicateSeries { group: String, series: String },

    #[error("{0} trailing bytes after collection")]
    TrailingBytes(usize),
}

pub type Result<T> = std::result::Result<T, SerdesError>;
