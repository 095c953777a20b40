//! Time-versioned records.
//!
//! When several dated snapshots of the same data are loaded together, each
//! merged interval stores a [`History`]: the newest distinct version in full
//! and a chain of patches walking back in time.
//!
//! ```text
//! snapshots (oldest first)   2010 {a:1}  2011 {a:1}  2013 {a:2}
//! squashed                   2010 {a:1}              2013 {a:2}
//! stored                     latest = 2013 {a:2}, patches = [2013 -> 2010]
//! ```

use crate::error::CoreResult;
use crate::merge::try_merge_ranges;
use crate::record::{Range, Record};
use crate::snapshot::{diff_incremental, patch_incremental, squash_duplicates, Patch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Every distinct version of one range, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    latest: Record,
    patches: Vec<Patch>,
}

impl History {
    /// Builds a history from unordered snapshots.
    ///
    /// Snapshots are sorted by `timestamp_key`, consecutive versions that
    /// differ only in the timestamp are collapsed to the earliest one, and the
    /// result is stored newest first. Snapshots without the key sort before
    /// all dated ones.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` if `snapshots` is empty.
    pub fn build(mut snapshots: Vec<Record>, timestamp_key: &str) -> CoreResult<Self> {
        snapshots.sort_by(|a, b| compare_timestamps(a.get(timestamp_key), b.get(timestamp_key)));

        let mut versions: Vec<Record> = squash_duplicates(snapshots, Some(timestamp_key)).collect();
        versions.reverse();

        let (latest, patches) = diff_incremental(versions)?;
        Ok(Self {
            latest,
            patches: patches.collect(),
        })
    }

    /// The newest version.
    #[must_use]
    pub fn latest(&self) -> &Record {
        &self.latest
    }

    /// Number of distinct versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len() + 1
    }

    /// Always false; a history holds at least one version.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All versions, newest first.
    pub fn versions(&self) -> impl Iterator<Item = Record> + '_ {
        std::iter::once(self.latest.clone())
            .chain(patch_incremental(self.latest.clone(), self.patches.iter()))
    }

    /// The newest version whose `timestamp_key` is at or before `timestamp`.
    ///
    /// Returns `None` when every version is newer.
    #[must_use]
    pub fn as_of(&self, timestamp: &Value, timestamp_key: &str) -> Option<Record> {
        let at_or_before = |version: &Record| {
            compare_timestamps(version.get(timestamp_key), Some(timestamp)) != Ordering::Greater
        };

        if at_or_before(&self.latest) {
            return Some(self.latest.clone());
        }

        let mut older = patch_incremental(self.latest.clone(), self.patches.iter());
        while let Some(version) = older.next_in_place() {
            if at_or_before(version) {
                return Some(version.clone());
            }
        }
        None
    }
}

/// Merges dated snapshot sources and builds one [`History`] per interval.
///
/// Each source is sorted by begin address with no overlaps; see
/// [`try_merge_ranges`].
pub fn build_histories<'a, I>(
    sources: impl IntoIterator<Item = I>,
    timestamp_key: &'a str,
) -> impl Iterator<Item = CoreResult<(Range, History)>> + 'a
where
    I: IntoIterator<Item = CoreResult<(Range, Record)>>,
    I::IntoIter: 'a,
{
    merge_histories(
        sources
            .into_iter()
            .map(|source| source.into_iter().map(single_version)),
        timestamp_key,
    )
}

/// Merges sources whose ranges each carry one or more versions.
///
/// Every merged interval collects the versions of all ranges open over it,
/// which lets an existing set of histories take part in a merge as one more
/// source.
pub(crate) fn merge_histories<'a, I>(
    sources: impl IntoIterator<Item = I>,
    timestamp_key: &'a str,
) -> impl Iterator<Item = CoreResult<(Range, History)>> + 'a
where
    I: IntoIterator<Item = CoreResult<(Range, Vec<Record>)>>,
    I::IntoIter: 'a,
{
    try_merge_ranges(sources).map(move |interval| {
        let (range, groups) = interval?.into_parts();
        let snapshots = groups.into_iter().flatten().collect();
        Ok((range, History::build(snapshots, timestamp_key)?))
    })
}

pub(crate) fn single_version(
    item: CoreResult<(Range, Record)>,
) -> CoreResult<(Range, Vec<Record>)> {
    item.map(|(range, record)| (range, vec![record]))
}

/// Orders timestamp values: missing first, then by JSON kind, strings
/// lexicographically and numbers numerically.
fn compare_timestamps(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        }
        (Some(a), Some(b)) => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
