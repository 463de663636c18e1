//! Selection planning: partition, rank, and bound the candidate set.
//!
//! Runs once collection halts. The download phase is expensive (a full
//! fetch per reference), so relevance is prioritized over discovery
//! order and higher resolution tiers are tried first.

use tracing::debug;

use super::resolution::tier_score;
use super::types::{Candidate, MediaReference};

/// Produce the final ordered download list, at most `limit` entries.
///
/// Relevant candidates are preferred; non-relevant ones only fill the
/// remainder when there are not enough relevant candidates. In
/// permissive mode the split carries no signal and the union is used.
/// Within the selection, references are ordered by descending
/// resolution-tier priority; ties keep their relative order.
#[must_use]
pub fn plan(candidates: &[Candidate], limit: usize, permissive: bool) -> Vec<MediaReference> {
    let (relevant, other): (Vec<_>, Vec<_>) =
        candidates.iter().partition(|c| c.is_relevant);

    debug!(
        "Planning from {} relevant and {} other candidates (limit {limit})",
        relevant.len(),
        other.len()
    );

    let mut selected: Vec<&Candidate> = if permissive {
        relevant.into_iter().chain(other).collect()
    } else if relevant.len() >= limit {
        relevant
    } else {
        // The fill from the non-relevant pool is chosen by tier
        // priority, not discovery order
        let mut other = other;
        other.sort_by_key(|c| std::cmp::Reverse(tier_score(c.reference.as_str())));

        let needed = limit - relevant.len();
        relevant
            .into_iter()
            .chain(other.into_iter().take(needed))
            .collect()
    };

    // Stable sort keeps equal-tier candidates in their existing order
    selected.sort_by_key(|c| std::cmp::Reverse(tier_score(c.reference.as_str())));

    selected
        .into_iter()
        .take(limit)
        .map(|c| c.reference.clone())
        .collect()
}
