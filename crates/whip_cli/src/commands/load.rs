//! Load command implementation.

use crate::reader::{iter_json, RangeFields};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use whip_core::{Config, RangeStore};

/// Runs the load command.
///
/// Every input is one dated snapshot. The inputs are merged with the
/// histories already in the store and each merged interval is stored as a
/// history, so a single input into an empty store yields single-version
/// histories.
pub fn run(
    path: &Path,
    inputs: &[PathBuf],
    fields: RangeFields,
    batch_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
    info!("Importing {} data files: {}", inputs.len(), names.join(", "));

    let sources = inputs
        .iter()
        .map(|input| {
            let file = File::open(input)
                .map_err(|e| format!("cannot open {}: {e}", input.display()))?;
            Ok(iter_json(BufReader::new(file), fields.clone()))
        })
        .collect::<Result<Vec<_>, String>>()?;

    let config = Config::default()
        .create_if_missing(true)
        .batch_size(batch_size);
    let mut store = RangeStore::open_with_config(path, config)?;

    let started = Instant::now();
    let count = store.try_load_snapshots(sources)?;
    info!(
        "Loaded {count} ranges in {:.2}s",
        started.elapsed().as_secs_f64()
    );

    Ok(())
}
