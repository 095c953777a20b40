//! # whip codec
//!
//! Byte layouts shared by the whip range store.
//!
//! ## Range keys
//!
//! A stored range is keyed by its begin and end address, each written as a
//! fixed-width big-endian integer:
//!
//! ```text
//! | begin (4, BE) | end (4, BE) |
//! ```
//!
//! Big-endian keeps lexicographic byte order equal to numeric order on
//! `begin`, with ties broken by `end`, which is what the point lookup relies
//! on.
//!
//! ## Values
//!
//! Stored values are CBOR documents produced with `ciborium`. The store
//! treats them as opaque bytes.
//!
//! ```
//! use whip_codec::{decode, encode, successor};
//!
//! let key = encode(0x0102_0300, 0x0102_03ff);
//! assert_eq!(decode(&key).unwrap(), (0x0102_0300, 0x0102_03ff));
//! assert_eq!(successor(u32::MAX), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod key;
mod value;

pub use error::{CodecError, CodecResult};
pub use key::{decode, encode, successor, Address, RangeKey, ADDRESS_WIDTH, KEY_WIDTH};
pub use value::{decode_value, encode_value};
