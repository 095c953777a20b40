//! Ordered key-value store backing the range index.
//!
//! The store keeps every key in an in-memory ordered map and persists writes
//! as an append-only log of batch records on a [`whip_storage::StorageBackend`].
//! Opening a store replays the log.
//!
//! ## Batch Record Format
//!
//! ```text
//! | magic (4) | version (2) | entry count (4) | payload length (4) | header crc32 (4) | payload (N) | crc32 (4) |
//! ```
//!
//! The payload is `entry count` repetitions of
//! `| key length (4) | key | value length (4) | value |`. All integers are
//! little-endian. The header crc covers the 14 bytes before it; the trailing
//! crc covers everything before it.
//!
//! ## Atomicity
//!
//! A batch becomes visible only after its whole record is appended, and is
//! applied to the map in one step. On replay:
//!
//! - A truncated header or payload at the tail is a batch torn by a crash.
//!   It is discarded and the log is cut back to the last complete record.
//! - A CRC mismatch in the header or the record, wrong magic or a newer
//!   format version is corruption and fails the open.
//!
//! So after a crash the store holds exactly the batches that committed.
//!
//! ## Reloads
//!
//! Replacing the whole content never touches the live log. The new content
//! is written to a fresh log from a [`LogStaging`], and only once it is
//! complete and synced does the staging swap it in.

mod batch;
mod log;
mod staging;
mod store;

pub use batch::WriteBatch;
pub use log::compute_crc32;
pub use staging::{LogStaging, MemoryStaging};
pub use store::{KvPair, LogStore, OrderedStore};
