//! Inspect command implementation.

use serde::Serialize;
use std::path::Path;
use whip_core::{RangeStore, Record};

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Number of stored ranges.
    pub range_count: usize,
    /// Range log size in bytes.
    pub log_size: u64,
    /// Lowest stored range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_range: Option<String>,
    /// Highest stored range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_range: Option<String>,
    /// Latest record of the lowest range (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Record>,
}

/// Runs the inspect command.
pub fn run(path: &Path, show_sample: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = RangeStore::open(path, false)?;
    let result = inspect(&store, path, show_sample)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }

    Ok(())
}

fn inspect(
    store: &RangeStore,
    path: &Path,
    show_sample: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut entries = store.entries();
    let first = entries.next().transpose()?;
    let last = entries.last().transpose()?.or(first);

    let sample = match first {
        Some((range, _)) if show_sample => store
            .lookup_history(range.begin())?
            .map(|history| history.latest().clone()),
        _ => None,
    };

    Ok(InspectResult {
        path: path.display().to_string(),
        range_count: store.len(),
        log_size: store.log_size()?,
        first_range: first.map(|(range, _)| range.to_string()),
        last_range: last.map(|(range, _)| range.to_string()),
        sample,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Store: {}", result.path);
    println!("Ranges: {}", result.range_count);
    println!("Log size: {} bytes", result.log_size);
    if let (Some(first), Some(last)) = (&result.first_range, &result.last_range) {
        println!("First range: {first}");
        println!("Last range: {last}");
    }
    if let Some(sample) = &result.sample {
        println!("Sample record:");
        for (key, value) in sample {
            println!("  {key}: {value}");
        }
    }
}
