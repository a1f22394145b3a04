//! Merge pass over every candidate collected during a sweep.

use std::collections::HashSet;

use crate::types::AddressCandidate;

/// Sorts by distance (stable), keeps the nearest instance of each trimmed
/// `full_address`, then drops anything beyond `radius_meters`.
///
/// The result depends only on the candidate multiset, except that equal
/// distances keep their input order.
#[must_use]
pub fn aggregate(mut candidates: Vec<AddressCandidate>, radius_meters: u32) -> Vec<AddressCandidate> {
    candidates.sort_by(|a, b| a.distance_in_meters().total_cmp(&b.distance_in_meters()));

    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    candidates.retain(|c| seen.insert(c.full_address().trim().to_string()));

    let radius = f64::from(radius_meters);
    candidates.retain(|c| c.distance_in_meters() <= radius);
    candidates
}
