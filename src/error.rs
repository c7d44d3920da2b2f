//! Error types for PackStream encoding and decoding.

/// Errors that can occur while packing or unpacking PackStream values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackStreamError {
    /// The window size does not match what the marker declares.
    #[error("wrong length: {0}")]
    WrongLength(String),

    /// The leading byte is not a valid marker for the expected type.
    #[error("unexpected marker byte 0x{0:02X}")]
    WrongMarker(u8),

    /// Structurally plausible bytes that do not form a valid value.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A length prefix or nested value runs past the end of the window.
    #[error("buffer underflow: need {needed} bytes but only {available} remaining")]
    BufferUnderflow { needed: usize, available: usize },

    /// Encode only: a length exceeds the largest length class.
    #[error("value too large: {0}")]
    ValueTooLarge(String),

    /// Encode only: the value has no PackStream representation.
    #[error("value not packable: {0}")]
    NotPackable(String),

    /// A reserved wire type that this codec does not implement.
    #[error("unsupported type: {0}")]
    Unsupported(String),

    /// Nested lists, maps or structures go deeper than the decoder allows.
    #[error("nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),
}

impl PackStreamError {
    /// Returns `true` if more input may turn this failure into a success.
    ///
    /// Only [`BufferUnderflow`](Self::BufferUnderflow) qualifies; every other
    /// kind means the bytes are malformed and retrying cannot help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BufferUnderflow { .. })
    }

    pub(crate) fn wrong_length(what: &str, expected: usize, actual: usize) -> Self {
        Self::WrongLength(format!("{what} needs {expected} bytes, got {actual}"))
    }

    pub(crate) fn underflow(needed: usize, available: usize) -> Self {
        Self::BufferUnderflow { needed, available }
    }
}
