//! Ordered store trait and the log-backed implementation.

use crate::error::CoreResult;
use crate::kv::batch::WriteBatch;
use crate::kv::log;
use crate::kv::staging::LogStaging;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tracing::{debug, warn};
use whip_storage::StorageBackend;

/// A borrowed key-value pair.
pub type KvPair<'a> = (&'a [u8], &'a [u8]);

/// What the range index needs from a key-value backend.
///
/// Keys are ordered bytewise. Range iteration must be double-ended so that a
/// point lookup can seek to a bound and walk backwards from it.
pub trait OrderedStore: Send + Sync {
    /// Applies all writes in `batch`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be made durable; the store is
    /// left without any of its writes.
    fn write_batch(&mut self, batch: WriteBatch) -> CoreResult<()>;

    /// Iterates over the entries between `lower` and `upper`.
    ///
    /// `next` walks in ascending key order, `next_back` in descending order.
    /// An inverted or empty pair of bounds yields nothing.
    fn range<'a>(
        &'a self,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
    ) -> Box<dyn DoubleEndedIterator<Item = KvPair<'a>> + 'a>;

    /// Number of stored keys.
    fn len(&self) -> usize;

    /// Returns true if the store holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts an empty replacement for this store.
    ///
    /// Writes to the returned store are invisible through `self` until it is
    /// passed to [`install`](Self::install). Dropping it abandons the reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement cannot be created.
    fn stage(&self) -> CoreResult<Self>
    where
        Self: Sized;

    /// Replaces the whole content of this store with `staged`.
    ///
    /// # Errors
    ///
    /// Returns an error if the switch fails; the previous content is kept.
    fn install(&mut self, staged: Self) -> CoreResult<()>
    where
        Self: Sized;
}

/// An [`OrderedStore`] persisted as a log of batch records.
///
/// All keys live in a `BTreeMap`; the backend only ever sees appends, plus a
/// truncation when a torn tail is found at open. Whole-content replacement
/// goes through a fresh log obtained from `staging`.
pub struct LogStore {
    backend: Box<dyn StorageBackend>,
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    sync_on_commit: bool,
    staging: Arc<dyn LogStaging>,
}

impl LogStore {
    /// Opens a store over `backend`, replaying whatever it already holds.
    ///
    /// # Errors
    ///
    /// Returns `ChecksumMismatch` or `LogCorruption` if a complete record in
    /// the log is damaged, or a storage error.
    pub fn open(
        mut backend: Box<dyn StorageBackend>,
        sync_on_commit: bool,
        staging: Arc<dyn LogStaging>,
    ) -> CoreResult<Self> {
        let mut entries = BTreeMap::new();
        let mut batches = 0usize;

        let valid_end = log::replay(backend.as_ref(), |batch| {
            batches += 1;
            entries.extend(batch.into_entries());
        })?;

        let size = backend.size()?;
        if valid_end < size {
            warn!(
                discarded = size - valid_end,
                "discarding torn batch at end of range log"
            );
            backend.truncate(valid_end)?;
        }

        debug!(batches, keys = entries.len(), "replayed range log");

        Ok(Self {
            backend,
            entries,
            sync_on_commit,
            staging,
        })
    }

    /// Size of the underlying log in bytes.
    pub fn log_size(&self) -> CoreResult<u64> {
        Ok(self.backend.size()?)
    }
}

impl OrderedStore for LogStore {
    fn write_batch(&mut self, batch: WriteBatch) -> CoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let record = log::encode_record(&batch)?;
        let start = self.backend.size()?;

        let committed = self.backend.append(&record).and_then(|_| {
            self.backend.flush()?;
            if self.sync_on_commit {
                self.backend.sync()?;
            }
            Ok(())
        });

        if let Err(e) = committed {
            // Keep later appends from landing behind a half-written record.
            if let Err(cleanup) = self.backend.truncate(start) {
                warn!(error = %cleanup, "failed to cut back partial batch");
            }
            return Err(e.into());
        }

        self.entries.extend(batch.into_entries());
        Ok(())
    }

    fn range<'a>(
        &'a self,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
    ) -> Box<dyn DoubleEndedIterator<Item = KvPair<'a>> + 'a> {
        if is_empty_range(lower, upper) {
            return Box::new(std::iter::empty());
        }

        Box::new(
            self.entries
                .range::<[u8], _>((lower, upper))
                .map(|(k, v)| (k.as_slice(), v.as_slice())),
        )
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn stage(&self) -> CoreResult<Self> {
        Ok(Self {
            backend: self.staging.create()?,
            entries: BTreeMap::new(),
            sync_on_commit: self.sync_on_commit,
            staging: Arc::clone(&self.staging),
        })
    }

    fn install(&mut self, mut staged: Self) -> CoreResult<()> {
        staged.backend.sync()?;
        self.staging.install()?;

        debug!(
            keys = staged.entries.len(),
            replaced = self.entries.len(),
            "installed replacement range log"
        );
        self.backend = staged.backend;
        self.entries = staged.entries;
        Ok(())
    }
}

/// `BTreeMap::range` panics on these; treat them as selecting nothing.
fn is_empty_range(lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> bool {
    match (lower, upper) {
        (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
        (Bound::Included(lo), Bound::Excluded(hi))
        | (Bound::Excluded(lo), Bound::Included(hi))
        | (Bound::Excluded(lo), Bound::Excluded(hi)) => lo >= hi,
        _ => false,
    }
}
