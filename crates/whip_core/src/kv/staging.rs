//! Where replacement logs are built before they go live.

use crate::error::CoreResult;
use whip_storage::{InMemoryBackend, StorageBackend};

/// Provides the backend a replacement log is written to, and promotes it.
///
/// A reload writes the complete new content into the backend returned by
/// [`create`](Self::create). Until [`install`](Self::install) succeeds the
/// live log is untouched, so a crash or error during the reload leaves the
/// previous content in place.
pub trait LogStaging: Send + Sync {
    /// Returns a fresh, empty backend for a replacement log.
    ///
    /// Any leftover from an earlier, unfinished reload is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be created.
    fn create(&self) -> CoreResult<Box<dyn StorageBackend>>;

    /// Makes the most recently created backend the live log.
    ///
    /// # Errors
    ///
    /// Returns an error if the switch could not be made durable. The live log
    /// then still holds the previous content.
    fn install(&self) -> CoreResult<()>;
}

/// Staging for in-memory stores: nothing outlives the process, so there is
/// nothing to promote.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStaging;

impl LogStaging for MemoryStaging {
    fn create(&self) -> CoreResult<Box<dyn StorageBackend>> {
        Ok(Box::new(InMemoryBackend::new()))
    }

    fn install(&self) -> CoreResult<()> {
        Ok(())
    }
}
