//! Shortest-set resolution: the minimum distance and the complete tie set of
//! hub sequences achieving it for one sampled pair.
use serde::{Deserialize, Serialize};

use crate::ChallengeError;
use crate::PathRepository;
use crate::path::{HubSequence, RouteQuery, StopPattern};
use crate::sampler::CandidatePair;

/// Distances come from the store in miles with limited precision; two routes
/// within this margin are treated as tied rather than compared bitwise.
pub const DISTANCE_EPSILON: f64 = 1e-6;

/// The resolved optimum for one (origin, destination[, alliance]) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestSet {
    /// Minimum total distance in miles.
    pub shortest_distance: f64,
    /// Every hub sequence achieving the minimum. Complete, in query order.
    pub optimal_hub_sets: Vec<HubSequence>,
    /// Airport sequence of the first optimal row, endpoints inclusive.
    /// Display feedback only.
    pub canonical_route: Vec<String>,
}

/// Resolve the shortest distance and full tie set for a sampled pair.
///
/// # Errors
///
/// Returns [`ChallengeError::NoCandidateFound`] when no route rows match the
/// pair (the sampler guarantees some exist, but the store may have changed
/// underneath us), and propagates repository failures.
pub fn resolve_shortest_set<P>(
    repository: &P,
    pair: &CandidatePair,
    pattern: StopPattern,
) -> Result<ShortestSet, ChallengeError>
where
    P: PathRepository + ?Sized,
{
    let query = RouteQuery::pair(&pair.origin, &pair.destination, pattern, pair.alliance);
    let records = repository.find_by_pair(&query)?;
    let Some(best) = records.first() else {
        return Err(ChallengeError::NoCandidateFound);
    };

    let shortest_distance = best.total_distance;
    let canonical_route = best.full_route();
    let optimal_hub_sets = records
        .iter()
        .take_while(|record| (record.total_distance - shortest_distance).abs() < DISTANCE_EPSILON)
        .map(|record| record.hubs())
        .collect();

    Ok(ShortestSet {
        shortest_distance,
        optimal_hub_sets,
        canonical_route,
    })
}
