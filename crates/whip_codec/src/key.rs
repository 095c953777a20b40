//! Fixed-width range keys.

use crate::error::{CodecError, CodecResult};

/// A point in the indexed address space (an IPv4 address as an integer).
pub type Address = u32;

/// Width of one encoded address in bytes.
pub const ADDRESS_WIDTH: usize = std::mem::size_of::<Address>();

/// Width of an encoded range key in bytes.
pub const KEY_WIDTH: usize = 2 * ADDRESS_WIDTH;

/// An encoded `(begin, end)` pair.
pub type RangeKey = [u8; KEY_WIDTH];

/// Encodes a range as `begin ‖ end`, both big-endian.
#[must_use]
pub fn encode(begin: Address, end: Address) -> RangeKey {
    let mut key = [0u8; KEY_WIDTH];
    key[..ADDRESS_WIDTH].copy_from_slice(&begin.to_be_bytes());
    key[ADDRESS_WIDTH..].copy_from_slice(&end.to_be_bytes());
    key
}

/// Decodes a key produced by [`encode`].
///
/// # Errors
///
/// Returns [`CodecError::MalformedKey`] if `key` is not exactly
/// [`KEY_WIDTH`] bytes long.
pub fn decode(key: &[u8]) -> CodecResult<(Address, Address)> {
    if key.len() != KEY_WIDTH {
        return Err(CodecError::MalformedKey {
            expected: KEY_WIDTH,
            actual: key.len(),
        });
    }

    let (begin, end) = key.split_at(ADDRESS_WIDTH);
    let mut begin_bytes = [0u8; ADDRESS_WIDTH];
    let mut end_bytes = [0u8; ADDRESS_WIDTH];
    begin_bytes.copy_from_slice(begin);
    end_bytes.copy_from_slice(end);

    Ok((
        Address::from_be_bytes(begin_bytes),
        Address::from_be_bytes(end_bytes),
    ))
}

/// Returns the address following `address`.
///
/// `None` means there is no successor: `address` is the largest
/// representable address. The result never wraps around to zero.
#[must_use]
pub fn successor(address: Address) -> Option<Address> {
    address.checked_add(1)
}
