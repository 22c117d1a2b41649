//! Guess validation against the path graph.
//!
//! A guess is data, not an error: invalid guesses come back with a
//! user-facing message and never consume a try or touch session state.
use serde::{Deserialize, Serialize};

use crate::PathRepository;
use crate::challenge::ChallengeParams;
use crate::path::{HubSequence, StopPattern};
use crate::resolver::DISTANCE_EPSILON;

/// One player submission, validated against the path graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    /// Ordered hub codes, one per stop.
    pub hubs: HubSequence,
    pub is_valid: bool,
    /// Route distance in miles; populated when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<f64>,
    /// Distance above the optimum; zero means a winning guess.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_gap: Option<f64>,
    /// User-facing reason when invalid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Guess {
    fn valid(hubs: HubSequence, total_distance: f64, distance_gap: f64) -> Self {
        Self {
            hubs,
            is_valid: true,
            total_distance: Some(total_distance),
            distance_gap: Some(distance_gap),
            error: None,
        }
    }

    fn invalid(hubs: HubSequence, error: impl Into<String>) -> Self {
        Self {
            hubs,
            is_valid: false,
            total_distance: None,
            distance_gap: None,
            error: Some(error.into()),
        }
    }

    /// Whether this guess hit the optimum exactly.
    #[must_use]
    pub fn is_winning(&self) -> bool {
        self.distance_gap
            .is_some_and(|gap| gap.abs() < DISTANCE_EPSILON)
    }
}

fn invalid_route_message(params: &ChallengeParams) -> String {
    // Two-stop puzzles are alliance-scoped; say so, since that is the
    // constraint players most often trip over.
    match (params.pattern, params.alliance) {
        (StopPattern::TwoStop, Some(alliance)) => {
            format!("Invalid route within {alliance}")
        }
        _ => "Invalid route".to_string(),
    }
}

/// Validate a hub guess against the challenge's query constraints.
///
/// The guessed sequence must match an existing route row exactly (ordered).
/// On a match, the minimum distance is re-derived from the repository rather
/// than trusted from the challenge snapshot, so scoring tracks the live graph.
/// Repository failures surface as a soft invalid guess, not a process fault.
pub fn validate_guess<P>(repository: &P, params: &ChallengeParams, hubs: &[String]) -> Guess
where
    P: PathRepository + ?Sized,
{
    let guessed: HubSequence = hubs.iter().cloned().collect();
    if guessed.len() != params.pattern.stop_count() as usize {
        return Guess::invalid(guessed, invalid_route_message(params));
    }

    let exact = params.route_query().with_hubs(guessed.clone()).with_limit(1);
    let matched = match repository.find_by_pair(&exact) {
        Ok(rows) => rows,
        Err(err) => {
            log::warn!("guess validation query failed: {err}");
            return Guess::invalid(guessed, "Database error");
        }
    };
    let Some(route) = matched.first() else {
        return Guess::invalid(guessed, invalid_route_message(params));
    };

    let shortest = match repository.find_by_pair(&params.route_query().with_limit(1)) {
        Ok(rows) => match rows.first() {
            Some(best) => best.total_distance,
            // The exact query just matched, so an empty pair query means the
            // store changed between the two reads.
            None => {
                log::warn!("pair vanished between match and minimum queries");
                return Guess::invalid(guessed, "Database error");
            }
        },
        Err(err) => {
            log::warn!("shortest-distance query failed: {err}");
            return Guess::invalid(guessed, "Database error");
        }
    };

    let raw_gap = route.total_distance - shortest;
    let distance_gap = if raw_gap.abs() < DISTANCE_EPSILON { 0.0 } else { raw_gap };
    Guess::valid(guessed, route.total_distance, distance_gap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPathRepository;
    use crate::path::{Alliance, PairCandidate, PathRecord, RepositoryError, RouteQuery};

    fn record(hub1: &str, hub2: &str, distance: f64) -> PathRecord {
        PathRecord {
            origin: "JFK".into(),
            destination: "NRT".into(),
            pattern: StopPattern::TwoStop,
            hub1: hub1.into(),
            hub2: Some(hub2.into()),
            alliance: Some(Alliance::StarAlliance),
            total_distance: distance,
        }
    }

    fn params() -> ChallengeParams {
        ChallengeParams {
            origin: "JFK".into(),
            destination: "NRT".into(),
            pattern: StopPattern::TwoStop,
            alliance: Some(Alliance::StarAlliance),
        }
    }

    fn repo() -> MemoryPathRepository {
        MemoryPathRepository::new(vec![
            record("LAX", "HNL", 9000.0),
            record("ORD", "SEA", 8700.0),
            record("SFO", "HNL", 8700.0),
        ])
    }

    fn hubs(a: &str, b: &str) -> Vec<String> {
        vec![a.to_string(), b.to_string()]
    }

    #[test]
    fn optimal_guess_scores_zero_gap() {
        let guess = validate_guess(&repo(), &params(), &hubs("SFO", "HNL"));
        assert!(guess.is_valid);
        assert_eq!(guess.total_distance, Some(8700.0));
        assert_eq!(guess.distance_gap, Some(0.0));
        assert!(guess.is_winning());
    }

    #[test]
    fn suboptimal_guess_reports_the_gap() {
        let guess = validate_guess(&repo(), &params(), &hubs("LAX", "HNL"));
        assert!(guess.is_valid);
        assert_eq!(guess.distance_gap, Some(300.0));
        assert!(!guess.is_winning());
    }

    #[test]
    fn unknown_route_is_invalid_with_alliance_message() {
        let guess = validate_guess(&repo(), &params(), &hubs("MIA", "DFW"));
        assert!(!guess.is_valid);
        assert!(guess.error.as_deref().unwrap().starts_with("Invalid route"));
        assert!(guess.error.as_deref().unwrap().contains("Star Alliance"));
        assert_eq!(guess.total_distance, None);
    }

    #[test]
    fn hub_order_matters() {
        let guess = validate_guess(&repo(), &params(), &hubs("SEA", "ORD"));
        assert!(!guess.is_valid);
    }

    #[test]
    fn wrong_length_guess_is_invalid() {
        let guess = validate_guess(&repo(), &params(), &["ORD".to_string()]);
        assert!(!guess.is_valid);
    }

    #[test]
    fn repository_failure_is_a_soft_error() {
        struct DownRepo;
        impl PathRepository for DownRepo {
            fn find_by_pair(
                &self,
                _query: &RouteQuery,
            ) -> Result<Vec<PathRecord>, RepositoryError> {
                Err(RepositoryError::new("store offline"))
            }

            fn find_group_candidates(
                &self,
                _pattern: StopPattern,
                _alliance: Option<Alliance>,
            ) -> Result<Vec<PairCandidate>, RepositoryError> {
                Err(RepositoryError::new("store offline"))
            }
        }

        let guess = validate_guess(&DownRepo, &params(), &hubs("ORD", "SEA"));
        assert!(!guess.is_valid);
        assert_eq!(guess.error.as_deref(), Some("Database error"));
    }
}
