//! Brute-force reference results.
//!
//! Every function here walks individual addresses, so inputs must stay small.

use whip_core::Range;

/// Data of every range covering `address`, ordered by source index.
pub fn coverage_at<T: Clone>(sources: &[Vec<(Range, T)>], address: u32) -> Vec<T> {
    sources
        .iter()
        .filter_map(|source| {
            source
                .iter()
                .find(|(range, _)| range.contains(address))
                .map(|(_, data)| data.clone())
        })
        .collect()
}

/// Expected merge output: maximal runs of addresses with the same non-empty
/// coverage.
///
/// Matches the sweep whenever every range carries a distinct label, since
/// then every edge changes the coverage.
pub fn expected_merge<T: Clone + PartialEq>(sources: &[Vec<(Range, T)>]) -> Vec<(Range, Vec<T>)> {
    let Some(last) = sources.iter().flatten().map(|(r, _)| r.end()).max() else {
        return Vec::new();
    };

    let mut runs: Vec<(Range, Vec<T>)> = Vec::new();
    let mut open: Option<(u32, Vec<T>)> = None;

    for address in 0..=last {
        let here = coverage_at(sources, address);
        match open.take() {
            Some((begin, active)) if active == here => open = Some((begin, active)),
            Some((begin, active)) => {
                runs.push((Range::new(begin, address - 1).expect("run is ordered"), active));
                if !here.is_empty() {
                    open = Some((address, here));
                }
            }
            None if !here.is_empty() => open = Some((address, here)),
            None => {}
        }
    }
    if let Some((begin, active)) = open {
        runs.push((Range::new(begin, last).expect("run is ordered"), active));
    }

    runs
}

/// Expected lookup result over a set of disjoint ranges.
pub fn expected_lookup<T: Clone>(ranges: &[(Range, T)], address: u32) -> Option<T> {
    ranges
        .iter()
        .find(|(range, _)| range.contains(address))
        .map(|(_, data)| data.clone())
}
