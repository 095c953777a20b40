//! Snapshot diffs.
//!
//! A [`Patch`] turns one [`Record`] into another: `to_set` holds every key
//! whose value is new or changed, `to_delete` every key that disappeared.
//! A sequence of snapshots compresses to its first record plus one patch per
//! following snapshot.

use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Changes that turn a base record into a target record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Keys to add or overwrite.
    pub to_set: BTreeMap<String, Value>,
    /// Keys to remove.
    pub to_delete: Vec<String>,
}

impl Patch {
    /// Returns true if applying the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_set.is_empty() && self.to_delete.is_empty()
    }
}

/// Computes the patch that turns `base` into `current`.
///
/// `to_delete` lists removed keys in ascending order.
#[must_use]
pub fn diff(current: &Record, base: &Record) -> Patch {
    let to_set = current
        .iter()
        .filter(|(key, value)| base.get(key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let to_delete = base
        .keys()
        .filter(|key| !current.contains_key(key))
        .cloned()
        .collect();

    Patch { to_set, to_delete }
}

/// Applies `patch` to a copy of `base`.
#[must_use]
pub fn patch(base: &Record, patch: &Patch) -> Record {
    let mut result = base.clone();
    patch_in_place(&mut result, patch);
    result
}

/// Applies `patch` to `target` directly.
///
/// `to_set` is applied before `to_delete`, so a key listed in both ends up
/// removed. Deleting a key that is not present is a no-op.
pub fn patch_in_place(target: &mut Record, patch: &Patch) {
    target.extend(
        patch
            .to_set
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    for key in &patch.to_delete {
        target.remove(key);
    }
}

/// Compresses a snapshot sequence into its first record and a lazy stream
/// of forward patches.
///
/// Patch `i` turns snapshot `i` into snapshot `i + 1`.
///
/// # Errors
///
/// Returns [`CoreError::EmptyInput`] if `snapshots` yields nothing.
pub fn diff_incremental<I>(snapshots: I) -> CoreResult<(Record, DiffIncremental<I::IntoIter>)>
where
    I: IntoIterator<Item = Record>,
{
    let mut rest = snapshots.into_iter();
    let base = rest
        .next()
        .ok_or_else(|| CoreError::empty_input("diff_incremental needs at least one snapshot"))?;

    Ok((
        base.clone(),
        DiffIncremental {
            previous: base,
            rest,
        },
    ))
}

/// Lazy patch stream returned by [`diff_incremental`].
#[derive(Debug)]
pub struct DiffIncremental<I> {
    previous: Record,
    rest: I,
}

impl<I: Iterator<Item = Record>> Iterator for DiffIncremental<I> {
    type Item = Patch;

    fn next(&mut self) -> Option<Patch> {
        let next = self.rest.next()?;
        let patch = diff(&next, &self.previous);
        self.previous = next;
        Some(patch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rest.size_hint()
    }
}

/// Replays `patches` on top of `base`.
///
/// The returned [`PatchIncremental`] is an `Iterator` of owned snapshots. For
/// long chains where copies matter, [`PatchIncremental::next_in_place`]
/// advances one working record and lends it out instead.
pub fn patch_incremental<I>(base: Record, patches: I) -> PatchIncremental<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Borrow<Patch>,
{
    PatchIncremental {
        current: base,
        patches: patches.into_iter(),
    }
}

/// Snapshot stream returned by [`patch_incremental`].
#[derive(Debug)]
pub struct PatchIncremental<I> {
    current: Record,
    patches: I,
}

impl<I> PatchIncremental<I>
where
    I: Iterator,
    I::Item: Borrow<Patch>,
{
    /// Applies the next patch to the working record and lends it out.
    ///
    /// The borrow ends before the following call, so a caller must clone
    /// anything it wants to keep.
    pub fn next_in_place(&mut self) -> Option<&Record> {
        let patch = self.patches.next()?;
        patch_in_place(&mut self.current, patch.borrow());
        Some(&self.current)
    }

    /// The working record as of the last applied patch.
    #[must_use]
    pub fn current(&self) -> &Record {
        &self.current
    }

    /// Consumes the stream, returning the working record.
    #[must_use]
    pub fn into_current(self) -> Record {
        self.current
    }
}

impl<I> Iterator for PatchIncremental<I>
where
    I: Iterator,
    I::Item: Borrow<Patch>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.next_in_place().cloned()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.patches.size_hint()
    }
}

/// Drops each snapshot equal to the one before it.
///
/// Equality ignores `ignored_key` when given. The first record of every run
/// is kept, so with a timestamp as `ignored_key` and oldest-first input each
/// surviving record carries the time its values were first seen.
pub fn squash_duplicates<'a, I>(
    snapshots: I,
    ignored_key: Option<&'a str>,
) -> impl Iterator<Item = Record> + 'a
where
    I: IntoIterator<Item = Record>,
    I::IntoIter: 'a,
{
    snapshots
        .into_iter()
        .dedup_by(move |kept, next| kept.eq_ignoring(next, ignored_key))
}
