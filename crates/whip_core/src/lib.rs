//! # whip core
//!
//! An on-disk index from address ranges to records.
//!
//! This crate provides:
//! - [`RangeStore`]: bulk load of `(range, value)` pairs and point lookup
//! - [`merge_ranges`]: a sweep-line merge of several range streams into
//!   intervals of constant coverage
//! - [`snapshot`]: record diffs and incremental patch chains
//! - [`History`]: time-versioned records built from dated snapshots
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use whip_core::{Range, RangeStore, Record};
//!
//! let mut store = RangeStore::open_in_memory().unwrap();
//! let mut record = Record::new();
//! record.insert("country", json!("NL"));
//!
//! store.load(vec![(Range::new(100, 200).unwrap(), record)]).unwrap();
//!
//! let hit = store.lookup(150).unwrap().unwrap();
//! assert_eq!(hit.get("country"), Some(&json!("NL")));
//! assert!(store.lookup(201).unwrap().is_none());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dir;
mod error;
mod history;
pub mod kv;
mod merge;
mod progress;
mod record;
pub mod snapshot;
mod store;

pub use config::{Config, DEFAULT_BATCH_SIZE, DEFAULT_PROGRESS_INTERVAL, DEFAULT_TIMESTAMP_KEY};
pub use dir::{FileStaging, StoreDir};
pub use error::{CoreError, CoreResult};
pub use history::{build_histories, History};
pub use merge::{merge_ranges, try_merge_ranges, MergeRanges, MergedInterval};
pub use progress::{LoadProgress, LogProgress, NoProgress};
pub use record::{Range, Record};
pub use snapshot::{
    diff, diff_incremental, patch, patch_in_place, patch_incremental, squash_duplicates,
    DiffIncremental, Patch, PatchIncremental,
};
pub use store::RangeStore;

pub use whip_codec::Address;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
