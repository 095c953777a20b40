//! Shared helpers for the whip benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
