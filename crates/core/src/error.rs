//! Decode error taxonomy shared by every codec in the crate.

use thiserror::Error;

/// Errors that can occur while decoding wire or storage bytes.
///
/// Decoding never panics on input: truncated, oversized or otherwise
/// malformed bytes always surface as one of these variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The cursor ran out of bytes. A streaming caller may retry once more
    /// data has arrived.
    #[error("insufficient data: needed {needed} bytes, {remaining} remaining")]
    InsufficientData { needed: usize, remaining: usize },

    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    #[error("{count} trailing bytes after complete value")]
    TrailingBytes { count: usize },

    #[error("{field} length {len} exceeds limit {max}")]
    SizeLimitExceeded {
        field: &'static str,
        len: u64,
        max: u64,
    },

    #[error("recovered square root failed verification")]
    InvalidSquareRoot,

    #[error("square root search gave up after {0} attempts")]
    SqrtAttemptsExhausted(usize),
}

impl DecodeError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            reason: reason.into(),
        }
    }

    /// True when more input could turn this failure into a success.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
