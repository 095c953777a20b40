//! Error types for whip core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in whip core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] whip_storage::StorageError),

    /// Key or value codec error.
    #[error("codec error: {0}")]
    Codec(#[from] whip_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store location could not be opened.
    #[error("cannot open store: {message}")]
    OpenError {
        /// Why the store could not be opened.
        message: String,
    },

    /// Another handle holds the store's lock.
    #[error("store locked: another process has exclusive access")]
    StoreLocked,

    /// The range log is corrupted or written by a newer format.
    #[error("range log corruption: {message}")]
    LogCorruption {
        /// Description of the corruption.
        message: String,
    },

    /// Checksum mismatch in a batch record.
    #[error("checksum mismatch at offset {offset}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Offset of the damaged batch record.
        offset: u64,
        /// Checksum stored in the record.
        expected: u32,
        /// Checksum computed over the record.
        actual: u32,
    },

    /// Range merge input broke the sorted, non-overlapping precondition.
    #[error("corrupt merge input: {message}")]
    CorruptMergeInput {
        /// What went wrong in the sweep.
        message: String,
    },

    /// An operation that needs at least one snapshot got none.
    #[error("empty input: {message}")]
    EmptyInput {
        /// Which operation received the empty input.
        message: String,
    },

    /// A range with `begin > end`.
    #[error("invalid range: begin {begin} is greater than end {end}")]
    InvalidRange {
        /// Range begin.
        begin: u32,
        /// Range end.
        end: u32,
    },

    /// An input record could not be turned into a range and record.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// Stored entries are not globally non-overlapping.
    #[error("corrupt store: {message}")]
    CorruptStore {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an open error.
    pub fn open_error(message: impl Into<String>) -> Self {
        Self::OpenError {
            message: message.into(),
        }
    }

    /// Creates a range log corruption error.
    pub fn log_corruption(message: impl Into<String>) -> Self {
        Self::LogCorruption {
            message: message.into(),
        }
    }

    /// Creates a corrupt merge input error.
    pub fn corrupt_merge_input(message: impl Into<String>) -> Self {
        Self::CorruptMergeInput {
            message: message.into(),
        }
    }

    /// Creates an empty input error.
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            message: message.into(),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a corrupt store error.
    pub fn corrupt_store(message: impl Into<String>) -> Self {
        Self::CorruptStore {
            message: message.into(),
        }
    }
}
