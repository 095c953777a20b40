//! Codec error types.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding keys and values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A range key did not have the fixed key width.
    #[error("malformed range key: expected {expected} bytes, got {actual}")]
    MalformedKey {
        /// Required key width.
        expected: usize,
        /// Length of the key that was supplied.
        actual: usize,
    },

    /// A value could not be serialized.
    #[error("value encoding failed: {0}")]
    Encode(String),

    /// A stored value could not be deserialized.
    #[error("value decoding failed: {0}")]
    Decode(String),
}
