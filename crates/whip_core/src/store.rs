//! The range store: bulk loading and point lookup.

use crate::config::Config;
use crate::dir::StoreDir;
use crate::error::{CoreError, CoreResult};
use crate::history::{merge_histories, single_version, History};
use crate::kv::{LogStore, MemoryStaging, OrderedStore, WriteBatch};
use crate::progress::{LoadProgress, LogProgress};
use crate::record::{Range, Record};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use whip_codec::{decode_value, encode, encode_value, successor, Address};
use whip_storage::{FileBackend, InMemoryBackend};

/// An index of non-overlapping address ranges, each mapped to a value.
///
/// Ranges are stored under their [`encode`]d key, so the store is ordered by
/// begin address. A lookup seeks to the last key before the address's
/// successor and checks whether the range found there covers the address.
///
/// Every load replaces the whole content. The new ranges are written to a
/// staged log that takes over only once it is complete, so readers and a
/// crashed load never see a mix of old and new ranges.
///
/// Loading assumes the input ranges do not overlap; when they do, a lookup
/// resolves to the range with the greatest begin at or below the address.
pub struct RangeStore<S: OrderedStore = LogStore> {
    config: Config,
    kv: S,
    dir: Option<StoreDir>,
}

type VersionSource<'a> = Box<dyn Iterator<Item = CoreResult<(Range, Vec<Record>)>> + 'a>;

impl RangeStore<LogStore> {
    /// Opens a store directory with default configuration.
    ///
    /// # Errors
    ///
    /// Returns `OpenError` if the directory is missing and
    /// `create_if_missing` is false, `StoreLocked` if another handle has it
    /// open, or an error while replaying the range log.
    pub fn open(path: &Path, create_if_missing: bool) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default().create_if_missing(create_if_missing))
    }

    /// Opens a store directory with custom configuration.
    ///
    /// ```rust,ignore
    /// use whip_core::{Config, RangeStore};
    /// use std::path::Path;
    ///
    /// let config = Config::default()
    ///     .create_if_missing(true)
    ///     .batch_size(50_000);
    ///
    /// let store = RangeStore::open_with_config(Path::new("db"), config)?;
    /// ```
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let dir = StoreDir::open(path, config.create_if_missing)?;
        let backend = FileBackend::open(&dir.log_path())?;
        let kv = LogStore::open(
            Box::new(backend),
            config.sync_on_commit,
            Arc::new(dir.staging()),
        )?;

        info!(path = %path.display(), ranges = kv.len(), "opened range store");

        Ok(Self {
            config,
            kv,
            dir: Some(dir),
        })
    }

    /// Opens an in-memory store.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the file-backed open.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_in_memory_with_config(Config::default())
    }

    /// Opens an in-memory store with custom configuration.
    ///
    /// # Errors
    ///
    /// See [`open_in_memory`](Self::open_in_memory).
    pub fn open_in_memory_with_config(config: Config) -> CoreResult<Self> {
        let kv = LogStore::open(
            Box::new(InMemoryBackend::new()),
            config.sync_on_commit,
            Arc::new(MemoryStaging),
        )?;
        Ok(Self::with_store(kv, config))
    }

    /// Size of the range log in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot report its size.
    pub fn log_size(&self) -> CoreResult<u64> {
        self.kv.log_size()
    }
}

impl<S: OrderedStore> RangeStore<S> {
    /// Wraps an already opened key-value store.
    pub fn with_store(kv: S, config: Config) -> Self {
        Self {
            config,
            kv,
            dir: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the store directory, if file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(StoreDir::path)
    }

    /// Number of stored ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kv.len()
    }

    /// Returns true if no range is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kv.is_empty()
    }

    /// Replaces the content with `(range, value)` pairs, logging progress
    /// through `tracing`.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// See [`try_load_with_progress`](Self::try_load_with_progress).
    pub fn load<V, I>(&mut self, records: I) -> CoreResult<u64>
    where
        V: Serialize,
        I: IntoIterator<Item = (Range, V)>,
    {
        self.load_with_progress(records, &mut LogProgress)
    }

    /// Loads `(range, value)` pairs, reporting to `progress`.
    ///
    /// # Errors
    ///
    /// See [`try_load_with_progress`](Self::try_load_with_progress).
    pub fn load_with_progress<V, I>(
        &mut self,
        records: I,
        progress: &mut dyn LoadProgress,
    ) -> CoreResult<u64>
    where
        V: Serialize,
        I: IntoIterator<Item = (Range, V)>,
    {
        self.try_load_with_progress(records.into_iter().map(Ok), progress)
    }

    /// Loads pairs from a fallible source, logging progress through `tracing`.
    ///
    /// # Errors
    ///
    /// See [`try_load_with_progress`](Self::try_load_with_progress).
    pub fn try_load<V, I>(&mut self, records: I) -> CoreResult<u64>
    where
        V: Serialize,
        I: IntoIterator<Item = CoreResult<(Range, V)>>,
    {
        self.try_load_with_progress(records, &mut LogProgress)
    }

    /// Replaces the content with pairs from a fallible source.
    ///
    /// Records are written to a staged log in batches of
    /// [`Config::batch_size`], each committed atomically. Once the source is
    /// exhausted the staged log replaces the live one. `progress` receives a
    /// signal every [`Config::progress_interval`] records and once after the
    /// switch.
    ///
    /// # Errors
    ///
    /// Stops at the first source error, encoding error, or failed commit.
    /// The store then keeps its previous content.
    pub fn try_load_with_progress<V, I>(
        &mut self,
        records: I,
        progress: &mut dyn LoadProgress,
    ) -> CoreResult<u64>
    where
        V: Serialize,
        I: IntoIterator<Item = CoreResult<(Range, V)>>,
    {
        let (staged, count) = self.write_staged(records, progress)?;
        self.kv.install(staged)?;

        progress.finished(count);
        Ok(count)
    }

    /// Writes `records` into a fresh staged store and returns it unapplied.
    fn write_staged<V, I>(
        &self,
        records: I,
        progress: &mut dyn LoadProgress,
    ) -> CoreResult<(S, u64)>
    where
        V: Serialize,
        I: IntoIterator<Item = CoreResult<(Range, V)>>,
    {
        let batch_size = self.config.batch_size.max(1);
        let interval = self.config.progress_interval;
        let mut staged = self.kv.stage()?;
        let mut count = 0u64;

        for chunk in &records.into_iter().chunks(batch_size) {
            let mut batch = WriteBatch::with_capacity(batch_size);
            for item in chunk {
                let (range, value) = item?;
                batch.put(range.key(), encode_value(&value)?);
                count += 1;
                if interval > 0 && count % interval == 0 {
                    progress.records_indexed(count);
                }
            }
            debug!(entries = batch.len(), "committing batch");
            staged.write_batch(batch)?;
        }

        Ok((staged, count))
    }

    /// Finds the stored range covering `address` and its value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key found is malformed.
    pub fn lookup_raw(&self, address: Address) -> CoreResult<Option<(Range, &[u8])>> {
        let upper_key;
        let upper = match successor(address) {
            Some(next) => {
                upper_key = encode(next, next);
                Bound::Excluded(&upper_key[..])
            }
            // Every key sorts below the end of the keyspace.
            None => Bound::Unbounded,
        };

        let Some((key, value)) = self.kv.range(Bound::Unbounded, upper).next_back() else {
            return Ok(None);
        };

        let range = Range::from_key(key)?;
        if address > range.end() {
            return Ok(None);
        }
        Ok(Some((range, value)))
    }

    /// Looks up the value stored for the range covering `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored key or value cannot be decoded as `V`.
    pub fn lookup_as<V: DeserializeOwned>(&self, address: Address) -> CoreResult<Option<V>> {
        match self.lookup_raw(address)? {
            Some((_, value)) => Ok(Some(decode_value(value)?)),
            None => Ok(None),
        }
    }

    /// Looks up the record stored for the range covering `address`.
    ///
    /// # Errors
    ///
    /// See [`lookup_as`](Self::lookup_as).
    pub fn lookup(&self, address: Address) -> CoreResult<Option<Record>> {
        self.lookup_as(address)
    }

    /// Iterates over all stored ranges in key order with their raw values.
    pub fn entries(&self) -> impl Iterator<Item = CoreResult<(Range, &[u8])>> + '_ {
        self.kv
            .range(Bound::Unbounded, Bound::Unbounded)
            .map(|(key, value)| Ok((Range::from_key(key)?, value)))
    }

    /// Checks that every key decodes and that stored ranges don't overlap.
    ///
    /// Returns the number of ranges checked.
    ///
    /// # Errors
    ///
    /// Returns `CorruptStore` at the first overlap, or the decode error of
    /// the first malformed key.
    pub fn verify(&self) -> CoreResult<usize> {
        let mut previous: Option<Range> = None;
        let mut count = 0usize;

        for entry in self.entries() {
            let (range, _) = entry?;
            if let Some(previous) = previous {
                if range.begin() <= previous.end() {
                    return Err(CoreError::corrupt_store(format!(
                        "range {range} overlaps {previous}"
                    )));
                }
            }
            previous = Some(range);
            count += 1;
        }

        Ok(count)
    }

    /// Merges dated snapshot sources into the stored histories.
    ///
    /// The histories already in the store take part in the merge as one more
    /// source, so loading snapshots one at a time builds the same histories
    /// as loading them all at once. The result replaces the whole content.
    /// Snapshots are ordered by [`Config::timestamp_key`].
    ///
    /// # Errors
    ///
    /// See [`try_load_snapshots`](Self::try_load_snapshots).
    pub fn load_snapshots<I>(&mut self, sources: impl IntoIterator<Item = I>) -> CoreResult<u64>
    where
        I: IntoIterator<Item = (Range, Record)>,
    {
        let sources: Vec<_> = sources
            .into_iter()
            .map(|source| source.into_iter().map(Ok))
            .collect();
        self.try_load_snapshots(sources)
    }

    /// Like [`load_snapshots`](Self::load_snapshots), for fallible sources.
    ///
    /// # Errors
    ///
    /// Returns `CorruptMergeInput` if a source is unsorted or overlaps
    /// itself, a decode error if the store holds values that are not
    /// histories, or any source, encoding, or commit error. The store then
    /// keeps its previous content.
    pub fn try_load_snapshots<I>(&mut self, sources: impl IntoIterator<Item = I>) -> CoreResult<u64>
    where
        I: IntoIterator<Item = CoreResult<(Range, Record)>>,
    {
        let timestamp_key = self.config.timestamp_key.clone();
        let mut progress = LogProgress;

        let mut inputs: Vec<VersionSource<'_>> = Vec::new();
        if !self.is_empty() {
            inputs.push(Box::new(self.stored_versions()));
        }
        inputs.extend(sources.into_iter().map(|source| {
            Box::new(source.into_iter().map(single_version)) as VersionSource<'_>
        }));

        let histories = merge_histories(inputs, &timestamp_key);
        let (staged, count) = self.write_staged(histories, &mut progress)?;
        self.kv.install(staged)?;

        progress.finished(count);
        Ok(count)
    }

    /// Every stored range with all versions of its history.
    fn stored_versions(&self) -> impl Iterator<Item = CoreResult<(Range, Vec<Record>)>> + '_ {
        self.entries().map(|entry| {
            let (range, value) = entry?;
            let history: History = decode_value(value)?;
            Ok((range, history.versions().collect()))
        })
    }

    /// Looks up the history stored for the range covering `address`.
    ///
    /// Only meaningful on stores filled by [`load_snapshots`](Self::load_snapshots).
    ///
    /// # Errors
    ///
    /// See [`lookup_as`](Self::lookup_as).
    pub fn lookup_history(&self, address: Address) -> CoreResult<Option<History>> {
        self.lookup_as(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::from(map),
            other => panic!("not an object: {other}"),
        }
    }

    fn range(begin: u32, end: u32) -> Range {
        Range::new(begin, end).unwrap()
    }

    fn two_range_store() -> RangeStore {
        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load(vec![
                (range(100, 200), record(json!({"name": "R1"}))),
                (range(201, 300), record(json!({"name": "R2"}))),
            ])
            .unwrap();
        store
    }

    #[test]
    fn lookup_hits_and_misses() {
        let store = two_range_store();
        let name = |addr| {
            store
                .lookup(addr)
                .unwrap()
                .map(|r| r.get("name").cloned().unwrap())
        };

        assert_eq!(name(150), Some(json!("R1")));
        assert_eq!(name(100), Some(json!("R1")));
        assert_eq!(name(200), Some(json!("R1")));
        assert_eq!(name(201), Some(json!("R2")));
        assert_eq!(name(300), Some(json!("R2")));
        assert_eq!(name(50), None);
        assert_eq!(name(350), None);
        assert_eq!(name(0), None);
    }

    #[test]
    fn lookup_raw_reports_the_covering_range() {
        let store = two_range_store();
        let (found, _) = store.lookup_raw(250).unwrap().unwrap();
        assert_eq!(found, range(201, 300));
    }

    #[test]
    fn lookup_on_empty_store_misses() {
        let store = RangeStore::open_in_memory().unwrap();
        assert!(store.lookup(0).unwrap().is_none());
        assert!(store.lookup(u32::MAX).unwrap().is_none());
    }

    #[test]
    fn lookup_at_top_of_address_space() {
        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load(vec![
                (range(0, 0), json!("bottom")),
                (range(u32::MAX - 10, u32::MAX), json!("top")),
            ])
            .unwrap();

        assert_eq!(store.lookup_as::<Value>(u32::MAX).unwrap(), Some(json!("top")));
        assert_eq!(store.lookup_as::<Value>(0).unwrap(), Some(json!("bottom")));
        assert_eq!(store.lookup_as::<Value>(1).unwrap(), None);
    }

    #[test]
    fn single_address_ranges() {
        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load((0..10u32).step_by(2).map(|a| (Range::single(a), a)))
            .unwrap();

        for a in 0..10u32 {
            let expected = (a % 2 == 0).then_some(a);
            assert_eq!(store.lookup_as::<u32>(a).unwrap(), expected);
        }
    }

    #[test]
    fn load_batches_and_reports_progress() {
        let config = Config::default().batch_size(3).progress_interval(4);
        let mut store = RangeStore::open_in_memory_with_config(config).unwrap();

        let signals = RefCell::new(Vec::new());
        let mut progress = |count: u64| signals.borrow_mut().push(count);
        let loaded = store
            .load_with_progress((0..10u32).map(|i| (range(i * 10, i * 10 + 9), i)), &mut progress)
            .unwrap();

        assert_eq!(loaded, 10);
        assert_eq!(store.len(), 10);
        assert_eq!(signals.into_inner(), vec![4, 8]);
        assert_eq!(store.verify().unwrap(), 10);
    }

    #[test]
    fn load_replaces_previous_content() {
        let mut store = two_range_store();
        store
            .load(vec![(range(150, 160), record(json!({"name": "R3"})))])
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup(120).unwrap(), None);
        assert_eq!(
            store.lookup(155).unwrap().and_then(|r| r.get("name").cloned()),
            Some(json!("R3"))
        );
        assert_eq!(store.verify().unwrap(), 1);
    }

    #[test]
    fn failed_load_keeps_previous_content() {
        let config = Config::default().batch_size(2);
        let mut store = RangeStore::open_in_memory_with_config(config).unwrap();
        store
            .load(vec![(range(0, 0), 10u32), (range(1, 1), 11)])
            .unwrap();

        let records: Vec<CoreResult<(Range, u32)>> = vec![
            Ok((range(0, 0), 0)),
            Ok((range(1, 1), 1)),
            Ok((range(2, 2), 2)),
            Err(CoreError::invalid_input("bad line")),
        ];

        assert!(matches!(
            store.try_load(records),
            Err(CoreError::InvalidInput { .. })
        ));
        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup_as::<u32>(0).unwrap(), Some(10));
        assert!(store.lookup_as::<u32>(2).unwrap().is_none());
    }

    #[test]
    fn reload_of_a_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = RangeStore::open(dir.path(), true).unwrap();
            store.load(vec![(range(0, 9), 1u32)]).unwrap();
            store.load(vec![(range(20, 29), 2u32)]).unwrap();
            assert_eq!(store.lookup_as::<u32>(25).unwrap(), Some(2));
        }

        let store = RangeStore::open(dir.path(), false).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup_as::<u32>(5).unwrap(), None);
        assert_eq!(store.lookup_as::<u32>(25).unwrap(), Some(2));
        assert!(!dir.path().join("ranges.log.new").exists());
    }

    #[test]
    fn verify_detects_overlap() {
        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load(vec![(range(0, 10), 0u8), (range(5, 20), 1u8)])
            .unwrap();

        assert!(matches!(
            store.verify(),
            Err(CoreError::CorruptStore { .. })
        ));
    }

    #[test]
    fn entries_are_in_key_order() {
        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load(vec![(range(30, 40), 3u8), (range(0, 5), 1u8), (range(10, 20), 2u8)])
            .unwrap();

        let ranges: Vec<Range> = store.entries().map(|e| e.unwrap().0).collect();
        assert_eq!(ranges, vec![range(0, 5), range(10, 20), range(30, 40)]);
    }

    #[test]
    fn snapshots_load_as_histories() {
        let dated = |datetime: &str, value: i64| record(json!({"datetime": datetime, "value": value}));

        let mut store = RangeStore::open_in_memory().unwrap();
        let loaded = store
            .load_snapshots(vec![
                vec![(range(0, 99), dated("2010", 1))],
                vec![(range(0, 49), dated("2011", 1)), (range(50, 99), dated("2011", 2))],
                vec![(range(0, 99), dated("2013", 3))],
            ])
            .unwrap();
        assert_eq!(loaded, 2);

        let low = store.lookup_history(10).unwrap().unwrap();
        assert_eq!(low.len(), 2);
        assert_eq!(low.latest(), &dated("2013", 3));
        assert_eq!(low.as_of(&json!("2012"), "datetime"), Some(dated("2010", 1)));

        let high = store.lookup_history(60).unwrap().unwrap();
        assert_eq!(high.len(), 3);
        assert_eq!(high.as_of(&json!("2011"), "datetime"), Some(dated("2011", 2)));
        assert_eq!(high.as_of(&json!("2009"), "datetime"), None);

        assert!(store.lookup_history(100).unwrap().is_none());
    }

    #[test]
    fn later_snapshots_merge_into_stored_histories() {
        let dated = |datetime: &str, x: i64| record(json!({"datetime": datetime, "x": x}));

        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load_snapshots(vec![vec![(range(0, 99), dated("2010", 1))]])
            .unwrap();
        store
            .load_snapshots(vec![vec![
                (range(0, 49), dated("2011", 7)),
                (range(50, 99), dated("2011", 8)),
            ]])
            .unwrap();

        let history = store.lookup_history(30).unwrap().unwrap();
        assert_eq!(history.latest(), &dated("2011", 7));
        assert_eq!(history.len(), 2);
        assert_eq!(history.as_of(&json!("2010"), "datetime"), Some(dated("2010", 1)));
        assert_eq!(store.verify().unwrap(), 2);
    }

    #[test]
    fn snapshots_cannot_merge_into_plain_values() {
        let mut store = two_range_store();
        let dated = record(json!({"datetime": "2010"}));

        assert!(store.load_snapshots(vec![vec![(range(0, 9), dated)]]).is_err());
        assert_eq!(store.len(), 2);
    }

    mod snapshot_loading {
        use super::*;
        use std::net::Ipv4Addr;

        type Snapshot = Vec<(Range, Record)>;

        fn ip(text: &str) -> Address {
            u32::from(text.parse::<Ipv4Addr>().unwrap())
        }

        fn t(begin: &str, end: &str, x: i64, datetime: &str) -> (Range, Record) {
            (
                Range::new(ip(begin), ip(end)).unwrap(),
                record(json!({"begin": begin, "end": end, "x": x, "datetime": datetime})),
            )
        }

        /// Initial data; a split that drops some ranges; a merge that updates
        /// every value.
        fn snapshots() -> (Snapshot, Snapshot, Snapshot) {
            (
                vec![
                    t("1.0.0.0", "1.255.255.255", 1, "2010"),
                    t("3.0.0.0", "3.255.255.255", 2, "2010"),
                    t("8.0.0.0", "9.255.255.255", 3, "2010"),
                ],
                vec![
                    t("1.0.0.0", "1.2.3.4", 7, "2011"),
                    t("1.2.3.5", "1.3.4.5", 8, "2011"),
                ],
                vec![
                    t("1.0.0.0", "1.255.255.255", 4, "2013"),
                    t("3.0.0.0", "3.255.255.255", 5, "2013"),
                    t("8.0.0.0", "9.255.255.255", 6, "2013"),
                ],
            )
        }

        fn x_at(store: &RangeStore, address: &str, datetime: Option<&str>) -> Option<Value> {
            let history = store.lookup_history(ip(address)).unwrap()?;
            let version = match datetime {
                None => Some(history.latest().clone()),
                Some(ts) => history.as_of(&json!(ts), "datetime"),
            };
            version.and_then(|r| r.get("x").cloned())
        }

        fn assert_loads_give_full_history(loads: Vec<Vec<Snapshot>>) {
            let mut store = RangeStore::open_in_memory().unwrap();
            for sources in loads {
                store.load_snapshots(sources).unwrap();
            }

            assert_eq!(x_at(&store, "1.0.0.0", None), Some(json!(4)));
            assert_eq!(x_at(&store, "1.255.255.255", None), Some(json!(4)));
            assert_eq!(x_at(&store, "7.0.0.0", None), None);
            assert_eq!(x_at(&store, "8.1.2.3", None), Some(json!(6)));
            assert_eq!(x_at(&store, "12.0.0.0", None), None);

            assert_eq!(x_at(&store, "1.2.3.3", Some("2010")), Some(json!(1)));
            assert_eq!(x_at(&store, "1.2.3.4", Some("2011")), Some(json!(7)));
            assert_eq!(x_at(&store, "1.2.3.5", Some("2011")), Some(json!(8)));
            assert_eq!(x_at(&store, "1.100.100.100", Some("2011")), Some(json!(1)));
            assert_eq!(x_at(&store, "8.1.2.3", Some("2011")), Some(json!(3)));
            assert_eq!(x_at(&store, "1.2.3.4", Some("2009")), None);
            assert_eq!(x_at(&store, "1.2.3.4", Some("2038")), Some(json!(4)));

            let all: Vec<Value> = store
                .lookup_history(ip("1.2.3.4"))
                .unwrap()
                .unwrap()
                .versions()
                .filter_map(|r| r.get("x").cloned())
                .collect();
            assert_eq!(all, vec![json!(4), json!(7), json!(1)]);

            store.verify().unwrap();
        }

        #[test]
        fn all_at_once() {
            let (s1, s2, s3) = snapshots();
            assert_loads_give_full_history(vec![vec![s1, s2, s3]]);
        }

        #[test]
        fn one_at_a_time() {
            let (s1, s2, s3) = snapshots();
            assert_loads_give_full_history(vec![vec![s1], vec![s2], vec![s3]]);
        }

        #[test]
        fn in_chunks() {
            let (s1, s2, s3) = snapshots();
            assert_loads_give_full_history(vec![vec![s1, s2], vec![s3], vec![]]);
        }

        #[test]
        fn shuffled_with_duplicate_snapshots() {
            let (s1, s2, s3) = snapshots();
            assert_loads_give_full_history(vec![
                vec![s3, s2.clone()],
                vec![s2, s1.clone()],
                vec![s1],
            ]);
        }
    }
}
