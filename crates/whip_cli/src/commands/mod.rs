//! CLI command implementations.

pub mod inspect;
pub mod load;
pub mod lookup;
pub mod perftest;
pub mod verify;
