//! Term selection for a report run.

use rand::Rng;
use tracing::debug;

/// Selects the working set of term keys for one report.
///
/// Returns `priority` in its given order, followed by exactly
/// `sample_count` keys drawn from `remaining` without replacement. Each
/// draw is uniform over the keys not yet taken, and the sampled suffix
/// keeps its draw order. Sampling is deliberately non-deterministic in
/// production so secondary terms rotate through the feed; callers inject
/// the `Rng`, and tests pass a seeded one.
///
/// # Errors
///
/// Returns
/// [`RatewireError::InvalidSampleSize`](crate::RatewireError::InvalidSampleSize)
/// when `sample_count` exceeds the number of remaining keys.
pub fn select_terms<R: Rng>(
    priority: &[&str],
    remaining: &[&str],
    sample_count: usize,
    rng: &mut R,
) -> crate::Result<Vec<String>> {
    if sample_count > remaining.len() {
        return Err(crate::RatewireError::InvalidSampleSize {
            requested: sample_count,
            available: remaining.len(),
        });
    }

    let mut selected: Vec<String> = priority.iter().map(|key| (*key).to_string()).collect();
    let mut candidates: Vec<&str> = remaining.to_vec();
    for _ in 0..sample_count {
        let index = rng.gen_range(0..candidates.len());
        selected.push(candidates.remove(index).to_string());
    }

    debug!(terms = ?selected, "Selected report terms");
    Ok(selected)
}
