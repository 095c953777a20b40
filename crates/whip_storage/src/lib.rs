//! # whip storage
//!
//! Byte-level storage backends for the whip range index.
//!
//! Backends are **opaque append-only byte stores**. The range log that sits
//! on top of them (batch records, checksums, recovery) lives in `whip_core`;
//! nothing in this crate knows about ranges, keys or records.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For tests and throwaway stores
//! - [`FileBackend`] - For persistent stores
//!
//! ## Example
//!
//! ```rust
//! use whip_storage::{InMemoryBackend, StorageBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"batch").unwrap();
//! assert_eq!(backend.read_at(offset, 5).unwrap(), b"batch");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
