//! Store configuration.

/// Number of records written per atomic batch.
pub const DEFAULT_BATCH_SIZE: usize = 20_000;

/// Number of records between two progress signals during a load.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

/// Record field holding the snapshot timestamp in history loads.
pub const DEFAULT_TIMESTAMP_KEY: &str = "datetime";

/// Configuration for opening and loading a range store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the store directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Records per atomic batch; bounds the memory held by one batch.
    pub batch_size: usize,

    /// Records between two progress signals.
    pub progress_interval: u64,

    /// Whether to sync the range log after every batch.
    pub sync_on_commit: bool,

    /// Record field that orders snapshots when building histories.
    pub timestamp_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: false,
            batch_size: DEFAULT_BATCH_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            sync_on_commit: true,
            timestamp_key: DEFAULT_TIMESTAMP_KEY.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the store if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the number of records per batch. Zero is treated as one.
    #[must_use]
    pub const fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the number of records between progress signals. Zero disables them.
    #[must_use]
    pub const fn progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Sets whether to sync the log after every batch.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets the timestamp field used to order snapshots.
    #[must_use]
    pub fn timestamp_key(mut self, key: impl Into<String>) -> Self {
        self.timestamp_key = key.into();
        self
    }
}
