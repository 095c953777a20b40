//! Verify command implementation.

use std::path::Path;
use whip_core::{History, RangeStore};

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of ranges checked.
    pub ranges_checked: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
///
/// Opening the store already replays the range log and checks every batch
/// checksum; this additionally checks range order and decodes every value.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying store at {}", path.display());
    println!();

    let store = RangeStore::open(path, false)?;
    let result = verify(&store);

    println!("Ranges checked: {}", result.ranges_checked);
    for error in &result.errors {
        println!("  {error}");
    }

    println!();
    if result.is_ok() {
        println!("✓ Store verification passed");
        Ok(())
    } else {
        println!("✗ Store verification failed");
        Err("Verification failed".into())
    }
}

fn verify(store: &RangeStore) -> VerifyResult {
    let mut result = VerifyResult::default();

    match store.verify() {
        Ok(count) => result.ranges_checked = count,
        Err(e) => result.errors.push(e.to_string()),
    }

    for entry in store.entries() {
        match entry {
            Ok((range, value)) => {
                if let Err(e) = whip_codec::decode_value::<History>(value) {
                    result.errors.push(format!("Undecodable value for {range}: {e}"));
                }
            }
            Err(e) => result.errors.push(e.to_string()),
        }
    }

    result
}
