//! Perftest command implementation.

use super::lookup::{lookup, Version};
use rand::Rng;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Instant;
use tracing::info;
use whip_core::RangeStore;

/// Runs the perftest command.
///
/// Looks up every address of `test_set` (one dotted quad per line) or, without
/// a test set, `iterations` random addresses.
pub fn run(
    path: &Path,
    iterations: usize,
    test_set: Option<&Path>,
    version: &Version,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = RangeStore::open(path, false)?;

    let addresses = match test_set {
        Some(file) => {
            info!("Using test set {}", file.display());
            read_test_set(&fs::read_to_string(file)?)?
        }
        None => {
            info!("Running {iterations} iterations with random IP addresses");
            random_addresses(iterations)
        }
    };

    let started = Instant::now();
    for &address in &addresses {
        lookup(&store, address, version)?;
    }
    let elapsed = started.elapsed().as_secs_f64();

    println!("{}", summary(addresses.len(), elapsed));
    Ok(())
}

fn random_addresses(count: usize) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen()).collect()
}

fn read_test_set(text: &str) -> Result<Vec<u32>, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<Ipv4Addr>()
                .map(u32::from)
                .map_err(|_| format!("invalid IP address in test set: {line}"))
        })
        .collect()
}

fn summary(lookups: usize, elapsed_secs: f64) -> String {
    let rate = if elapsed_secs > 0.0 {
        lookups as f64 / elapsed_secs
    } else {
        0.0
    };
    format!("{lookups} lookups in {elapsed_secs:.2}s ({rate:.2} req/s)")
}
