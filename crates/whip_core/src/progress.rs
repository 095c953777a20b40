//! Load progress reporting.

use tracing::info;

/// Receives progress signals while a store is being loaded.
///
/// `RangeStore` calls [`records_indexed`](Self::records_indexed) every
/// `Config::progress_interval` records and [`finished`](Self::finished) once
/// after the last batch committed.
pub trait LoadProgress {
    /// Called with the running number of records processed.
    fn records_indexed(&mut self, count: u64);

    /// Called once with the final count.
    fn finished(&mut self, _count: u64) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl LoadProgress for LogProgress {
    fn records_indexed(&mut self, count: u64) {
        info!("Indexed {count} records");
    }

    fn finished(&mut self, count: u64) {
        info!("Finished loading {count} records");
    }
}

/// Discards all signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl LoadProgress for NoProgress {
    fn records_indexed(&mut self, _count: u64) {}
}

impl<F: FnMut(u64)> LoadProgress for F {
    fn records_indexed(&mut self, count: u64) {
        self(count);
    }
}
