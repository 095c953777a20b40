//! Ranges and attribute records.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use whip_codec::{Address, RangeKey};

/// An inclusive `[begin, end]` interval of addresses.
///
/// `begin <= end` holds for every value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    begin: Address,
    end: Address,
}

impl Range {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] if `begin > end`.
    pub fn new(begin: Address, end: Address) -> CoreResult<Self> {
        if begin > end {
            return Err(CoreError::InvalidRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Creates a range covering exactly one address.
    #[must_use]
    pub const fn single(address: Address) -> Self {
        Self {
            begin: address,
            end: address,
        }
    }

    /// First address in the range.
    #[must_use]
    pub const fn begin(&self) -> Address {
        self.begin
    }

    /// Last address in the range.
    #[must_use]
    pub const fn end(&self) -> Address {
        self.end
    }

    /// Returns true if `address` lies inside the range.
    #[must_use]
    pub const fn contains(&self, address: Address) -> bool {
        self.begin <= address && address <= self.end
    }

    /// Encodes the range as a store key.
    #[must_use]
    pub fn key(&self) -> RangeKey {
        whip_codec::encode(self.begin, self.end)
    }

    /// Decodes a store key back into a range.
    ///
    /// # Errors
    ///
    /// Fails if the key has the wrong width or encodes `begin > end`.
    pub fn from_key(key: &[u8]) -> CoreResult<Self> {
        let (begin, end) = whip_codec::decode(key)?;
        Self::new(begin, end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            Ipv4Addr::from(self.begin),
            Ipv4Addr::from(self.end)
        )
    }
}

/// An attribute mapping attached to a range, and the unit of snapshot diffs.
///
/// Keys are kept ordered so that two records can be compared and diffed in
/// one pass over their keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns true if the record has a value for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over attributes in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Iterates over attribute names in order.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Compares two records while skipping `ignored_key` on both sides.
    #[must_use]
    pub fn eq_ignoring(&self, other: &Self, ignored_key: Option<&str>) -> bool {
        match ignored_key {
            None => self == other,
            Some(ignored) => self
                .iter()
                .filter(|(k, _)| k.as_str() != ignored)
                .eq(other.iter().filter(|(k, _)| k.as_str() != ignored)),
        }
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl From<serde_json::Map<String, Value>> for Record {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>> Extend<(K, Value)> for Record {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
