//! Crash testing for the range log.
//!
//! [`CrashableBackend`] keeps its bytes in memory shared with a
//! [`CrashHandle`]. The handle plays the role of a directory holding a live
//! log and, while a reload runs, a staged one. A test arms the handle, runs a
//! load until the simulated crash, then opens a fresh store over
//! [`CrashHandle::disk`] to see what recovery makes of the bytes that
//! reached "disk".
//!
//! ## Usage
//!
//! ```rust,ignore
//! use whip_testkit::crash::CrashableBackend;
//!
//! let (backend, handle) = CrashableBackend::new();
//! handle.crash_after(100);
//! // ... load through `handle.store(backend, config)` ...
//! let recovered = handle.reopen(Config::default())?;
//! ```

use parking_lot::RwLock;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use whip_core::kv::{LogStaging, LogStore, MemoryStaging};
use whip_core::{Config, CoreResult, RangeStore};
use whip_storage::{InMemoryBackend, StorageBackend, StorageError, StorageResult};

/// The bytes of one simulated file.
type Inode = Arc<RwLock<Vec<u8>>>;

#[derive(Debug)]
struct CrashState {
    live: RwLock<Inode>,
    staged: RwLock<Option<Inode>>,
    crash_after_bytes: AtomicUsize,
    crashed: AtomicBool,
    fail_on_flush: AtomicBool,
}

impl CrashState {
    fn crash(&self, what: &str) -> StorageError {
        self.crashed.store(true, Ordering::SeqCst);
        StorageError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("simulated crash during {what}"),
        ))
    }

    fn check_alive(&self) -> StorageResult<()> {
        if self.crashed.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "backend has crashed",
            )));
        }
        Ok(())
    }
}

/// A storage backend that can simulate a process crash.
///
/// Once crashed, every write fails; a real process would not get to clean up
/// after itself either.
#[derive(Debug)]
pub struct CrashableBackend {
    state: Arc<CrashState>,
    file: Inode,
}

/// Controls a [`CrashableBackend`] from outside the store that owns it.
#[derive(Debug, Clone)]
pub struct CrashHandle {
    state: Arc<CrashState>,
}

impl CrashableBackend {
    /// Creates a backend over an empty live log, and its handle.
    pub fn new() -> (Self, CrashHandle) {
        let live = Inode::default();
        let state = Arc::new(CrashState {
            live: RwLock::new(Arc::clone(&live)),
            staged: RwLock::new(None),
            crash_after_bytes: AtomicUsize::new(usize::MAX),
            crashed: AtomicBool::new(false),
            fail_on_flush: AtomicBool::new(false),
        });
        (
            Self {
                state: Arc::clone(&state),
                file: live,
            },
            CrashHandle { state },
        )
    }
}

impl CrashHandle {
    /// Crashes once the file being written would grow past `bytes`.
    ///
    /// The write crossing the threshold lands partially.
    pub fn crash_after(&self, bytes: usize) {
        self.state.crash_after_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Sets whether flush and sync should crash.
    pub fn set_fail_on_flush(&self, fail: bool) {
        self.state.fail_on_flush.store(fail, Ordering::SeqCst);
    }

    /// Returns whether the backend has crashed.
    pub fn has_crashed(&self) -> bool {
        self.state.crashed.load(Ordering::SeqCst)
    }

    /// Returns the bytes of the live log.
    pub fn disk(&self) -> Vec<u8> {
        self.state.live.read().read().clone()
    }

    /// Returns the bytes of the staged log, if a reload created one that was
    /// never installed.
    pub fn staged_disk(&self) -> Option<Vec<u8>> {
        self.state.staged.read().as_ref().map(|file| file.read().clone())
    }

    /// Builds a store over `backend` whose reloads are staged through this
    /// handle.
    pub fn store(&self, backend: CrashableBackend, config: Config) -> CoreResult<RangeStore> {
        let kv = LogStore::open(
            Box::new(backend),
            config.sync_on_commit,
            Arc::new(self.clone()),
        )?;
        Ok(RangeStore::with_store(kv, config))
    }

    /// Opens a fresh store over a copy of the surviving live bytes.
    pub fn reopen(&self, config: Config) -> CoreResult<RangeStore> {
        open_copy(self.disk(), config)
    }

    /// Opens a fresh store over a copy of the staged bytes, as recovery would
    /// see them had the reload been installed at the moment of the crash.
    pub fn reopen_staged(&self, config: Config) -> Option<CoreResult<RangeStore>> {
        self.staged_disk().map(|bytes| open_copy(bytes, config))
    }
}

fn open_copy(bytes: Vec<u8>, config: Config) -> CoreResult<RangeStore> {
    let kv = LogStore::open(
        Box::new(InMemoryBackend::with_data(bytes)),
        config.sync_on_commit,
        Arc::new(MemoryStaging),
    )?;
    Ok(RangeStore::with_store(kv, config))
}

impl LogStaging for CrashHandle {
    fn create(&self) -> CoreResult<Box<dyn StorageBackend>> {
        self.state.check_alive()?;
        let file = Inode::default();
        *self.state.staged.write() = Some(Arc::clone(&file));
        Ok(Box::new(CrashableBackend {
            state: Arc::clone(&self.state),
            file,
        }))
    }

    fn install(&self) -> CoreResult<()> {
        self.state.check_alive()?;
        if let Some(file) = self.state.staged.write().take() {
            *self.state.live.write() = file;
        }
        Ok(())
    }
}

impl StorageBackend for CrashableBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let file = self.file.read();
        let size = file.len() as u64;
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(len)?))
            .filter(|range| range.end <= file.len())
            .ok_or(StorageError::ReadPastEnd { offset, len, size })?;
        Ok(file[range].to_vec())
    }

    fn append(&mut self, bytes: &[u8]) -> StorageResult<u64> {
        self.state.check_alive()?;

        let mut file = self.file.write();
        let current = file.len();
        let threshold = self.state.crash_after_bytes.load(Ordering::SeqCst);

        if current + bytes.len() > threshold {
            let partial = threshold.saturating_sub(current).min(bytes.len());
            file.extend_from_slice(&bytes[..partial]);
            drop(file);
            return Err(self.state.crash("append"));
        }

        file.extend_from_slice(bytes);
        Ok(current as u64)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.state.check_alive()?;
        if self.state.fail_on_flush.load(Ordering::SeqCst) {
            return Err(self.state.crash("flush"));
        }
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.file.read().len() as u64)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.state.check_alive()?;
        if self.state.fail_on_flush.load(Ordering::SeqCst) {
            return Err(self.state.crash("sync"));
        }
        Ok(())
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        self.state.check_alive()?;
        let mut file = self.file.write();
        let size = file.len() as u64;
        if new_size > size {
            return Err(StorageError::TruncateBeyondEnd {
                requested: new_size,
                size,
            });
        }
        file.truncate(new_size as usize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::range;

    fn crashable(config: &Config) -> (RangeStore, CrashHandle) {
        let (backend, handle) = CrashableBackend::new();
        let store = handle.store(backend, config.clone()).unwrap();
        (store, handle)
    }

    fn ranges(count: u32) -> Vec<(whip_core::Range, u32)> {
        (0..count).map(|i| (range(i * 10, i * 10 + 9), i)).collect()
    }

    #[test]
    fn installed_reload_becomes_the_live_log() {
        let config = Config::default().batch_size(4);
        let (mut store, handle) = crashable(&config);

        store.load(ranges(8)).unwrap();
        assert!(handle.staged_disk().is_none());

        let recovered = handle.reopen(config).unwrap();
        assert_eq!(recovered.len(), 8);
        assert_eq!(recovered.lookup_as::<u32>(75).unwrap(), Some(7));
    }

    #[test]
    fn torn_reload_leaves_live_log_and_committed_staged_batches() {
        let config = Config::default().batch_size(4);

        // Measure how large two committed batches are.
        let (mut sizing, sizing_handle) = crashable(&config);
        sizing.load(ranges(8)).unwrap();
        let two_batches = sizing_handle.disk().len();

        let (mut store, handle) = crashable(&config);
        store.load(ranges(2)).unwrap();
        let before = handle.disk();

        handle.crash_after(two_batches + 7);
        assert!(store.load(ranges(12)).is_err());
        assert!(handle.has_crashed());

        // The live log never saw the failed reload.
        assert_eq!(handle.disk(), before);
        let recovered = handle.reopen(config.clone()).unwrap();
        assert_eq!(recovered.len(), 2);
        assert_eq!(recovered.lookup_as::<u32>(15).unwrap(), Some(1));
        assert_eq!(recovered.lookup_as::<u32>(75).unwrap(), None);

        // The staged log itself recovers at batch granularity.
        assert_eq!(handle.staged_disk().map(|d| d.len()), Some(two_batches + 7));
        let staged = handle.reopen_staged(config).unwrap().unwrap();
        assert_eq!(staged.len(), 8);
        assert_eq!(staged.lookup_as::<u32>(75).unwrap(), Some(7));
        assert_eq!(staged.lookup_as::<u32>(85).unwrap(), None);
        assert_eq!(staged.verify().unwrap(), 8);
    }

    #[test]
    fn crash_on_flush_keeps_previous_content() {
        let config = Config::default().batch_size(100);
        let (mut store, handle) = crashable(&config);
        store.load(ranges(1)).unwrap();

        handle.set_fail_on_flush(true);
        assert!(store.load(ranges(3)).is_err());
        assert_eq!(store.len(), 1);

        assert_eq!(handle.reopen(config.clone()).unwrap().len(), 1);

        // The whole record was appended to the staged log before the flush failed.
        let staged = handle.reopen_staged(config).unwrap().unwrap();
        assert_eq!(staged.len(), 3);
    }

    #[test]
    fn failed_write_without_crash_is_rolled_back() {
        let config = Config::default().batch_size(2);
        let mut store = RangeStore::open_in_memory_with_config(config).unwrap();
        store.load(ranges(2)).unwrap();
        let size = store.log_size().unwrap();

        let bad: Vec<CoreResult<(whip_core::Range, u32)>> = vec![
            Ok((range(100, 109), 10)),
            Err(whip_core::CoreError::invalid_input("unreadable line")),
        ];
        assert!(store.try_load(bad).is_err());
        assert_eq!(store.log_size().unwrap(), size);
        assert_eq!(store.len(), 2);
    }
}
