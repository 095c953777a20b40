//! Store directory management.
//!
//! ```text
//! <store_path>/
//! ├─ LOCK             # Advisory lock for single-writer
//! ├─ ranges.log       # Batch records
//! └─ ranges.log.new   # Replacement log while a reload runs
//! ```

use crate::error::{CoreError, CoreResult};
use crate::kv::LogStaging;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use whip_storage::{FileBackend, StorageBackend};

const LOCK_FILE: &str = "LOCK";
const LOG_FILE: &str = "ranges.log";
const STAGING_FILE: &str = "ranges.log.new";

/// An opened store directory. Holds an exclusive lock until dropped.
#[derive(Debug)]
pub struct StoreDir {
    path: PathBuf,
    _lock_file: File,
}

impl StoreDir {
    /// Opens a store directory.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `OpenError` if the directory doesn't exist and `create_if_missing`
    ///   is false, or the path is not a directory
    /// - `StoreLocked` if another handle holds the lock
    /// - I/O errors
    pub fn open(path: &Path, create_if_missing: bool) -> CoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(CoreError::open_error(format!(
                    "store directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(CoreError::open_error(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::StoreLocked);
        }

        // Left behind by a reload that never finished.
        if remove_if_present(&path.join(STAGING_FILE))? {
            debug!(path = %path.display(), "removed unfinished replacement log");
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the range log.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE)
    }

    /// Returns the staging that builds replacement logs next to the live one.
    #[must_use]
    pub fn staging(&self) -> FileStaging {
        FileStaging {
            dir: self.path.clone(),
        }
    }
}

/// Builds a replacement log in `ranges.log.new` and renames it over
/// `ranges.log`.
///
/// The rename is atomic, so after a crash the directory holds either the
/// complete old log or the complete new one.
#[derive(Debug, Clone)]
pub struct FileStaging {
    dir: PathBuf,
}

impl LogStaging for FileStaging {
    fn create(&self) -> CoreResult<Box<dyn StorageBackend>> {
        let path = self.dir.join(STAGING_FILE);
        remove_if_present(&path)?;
        Ok(Box::new(FileBackend::open(&path)?))
    }

    fn install(&self) -> CoreResult<()> {
        fs::rename(self.dir.join(STAGING_FILE), self.dir.join(LOG_FILE))?;
        sync_directory(&self.dir)
    }
}

fn remove_if_present(path: &Path) -> CoreResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Makes a rename inside `dir` durable.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> CoreResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

/// NTFS journals metadata updates; there is no directory handle to sync.
#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> CoreResult<()> {
    Ok(())
}
