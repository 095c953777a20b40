//! File-based storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A storage backend backed by a single file.
///
/// The file is only ever appended to, except for [`truncate`], which cuts a
/// torn tail off after a crash.
///
/// [`truncate`]: StorageBackend::truncate
///
/// # Example
///
/// ```no_run
/// use whip_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("ranges.log")).unwrap();
/// backend.append(b"batch").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    inner: Mutex<LogFile>,
}

/// The open file and its logical length, kept under one lock so a reader
/// never sees a length the file has not reached yet.
#[derive(Debug)]
struct LogFile {
    file: File,
    len: u64,
}

impl FileBackend {
    /// Opens the file at `path`, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(LogFile { file, len }),
        })
    }

    /// Returns the path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut log = self.inner.lock();
        let size = log.len;

        if offset.saturating_add(len as u64) > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        let mut buffer = vec![0u8; len];
        if len > 0 {
            log.file.seek(SeekFrom::Start(offset))?;
            log.file.read_exact(&mut buffer)?;
        }
        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let log = self.inner.get_mut();
        let offset = log.len;

        // Opened in append mode: every write lands at the end of the file.
        log.file.write_all(data)?;
        log.len += data.len() as u64;

        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.get_mut().file.flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.inner.lock().len)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.inner.get_mut().file.sync_data()?;
        Ok(())
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        let log = self.inner.get_mut();
        if new_size > log.len {
            return Err(StorageError::TruncateBeyondEnd {
                requested: new_size,
                size: log.len,
            });
        }

        log.file.set_len(new_size)?;
        log.file.sync_all()?;
        log.len = new_size;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ranges.log");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert_eq!(backend.path(), path);
        assert!(path.exists());
    }

    #[test]
    fn appended_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ranges.log");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.append(b"batch-1").unwrap(), 0);
            assert_eq!(backend.append(b"batch-2").unwrap(), 7);
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 14);
        assert_eq!(backend.read_at(7, 7).unwrap(), b"batch-2");
    }

    #[test]
    fn read_past_end_fails() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("ranges.log")).unwrap();
        backend.append(b"short").unwrap();

        assert!(matches!(
            backend.read_at(2, 10),
            Err(StorageError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn truncate_persists_new_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ranges.log");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"complete|torn").unwrap();
            backend.truncate(9).unwrap();
            assert!(backend.truncate(50).is_err());
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 9);
        assert_eq!(backend.read_at(0, 9).unwrap(), b"complete|");
    }
}
