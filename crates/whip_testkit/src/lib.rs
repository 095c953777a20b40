//! # whip testkit
//!
//! Test utilities for whip.
//!
//! This crate provides:
//! - Fixtures for temporary stores and quick records
//! - Property-based generators for range streams
//! - A brute-force coverage oracle to check merges and lookups against
//! - A storage backend that simulates crashes mid-batch
//!
//! ## Usage
//!
//! ```rust,ignore
//! use whip_testkit::prelude::*;
//!
//! #[test]
//! fn reopen_keeps_data() {
//!     let mut store = TestStore::file();
//!     store.load(vec![(range(0, 9), record(json!({"a": 1})))]).unwrap();
//!     let store = store.reopen();
//!     assert!(store.lookup(5).unwrap().is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;
pub mod oracle;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::oracle::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
pub use oracle::*;
