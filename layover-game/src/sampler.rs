//! Candidate sampling: pick an (origin, destination[, alliance]) pair with
//! enough route variants to make guessing non-trivial.
use rand::Rng;

use crate::ChallengeError;
use crate::PathRepository;
use crate::path::{Alliance, StopPattern};

/// Pairs with this many route rows or fewer are discarded; the puzzle needs
/// several plausible wrong hub choices to be interesting.
pub const MIN_GROUP_ROUTES: usize = 10;

/// Sampling attempts before giving up with [`ChallengeError::NoCandidateFound`].
pub const MAX_SAMPLE_ATTEMPTS: u32 = 10;

/// One sampled pair, ready for shortest-set resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub origin: String,
    pub destination: String,
    /// Chosen uniformly at random for two-stop puzzles, absent for one-stop.
    pub alliance: Option<Alliance>,
}

/// Sample one qualifying pair, retrying up to [`MAX_SAMPLE_ATTEMPTS`] times.
///
/// Each attempt re-rolls the alliance (two-stop only), so a thin alliance does
/// not doom the whole request. Repository failures consume an attempt rather
/// than aborting, keeping transient store hiccups survivable.
///
/// # Errors
///
/// Returns [`ChallengeError::NoCandidateFound`] once the attempt budget is
/// exhausted without a qualifying pair.
pub fn sample_pair<P, R>(
    repository: &P,
    pattern: StopPattern,
    rng: &mut R,
) -> Result<CandidatePair, ChallengeError>
where
    P: PathRepository + ?Sized,
    R: Rng,
{
    for attempt in 1..=MAX_SAMPLE_ATTEMPTS {
        let alliance = match pattern {
            StopPattern::TwoStop => {
                Some(Alliance::ALL[rng.gen_range(0..Alliance::ALL.len())])
            }
            StopPattern::OneStop => None,
        };

        let groups = match repository.find_group_candidates(pattern, alliance) {
            Ok(groups) => groups,
            Err(err) => {
                log::warn!("candidate query failed on attempt {attempt}: {err}");
                continue;
            }
        };

        let eligible: Vec<_> = groups
            .into_iter()
            .filter(|group| group.route_count > MIN_GROUP_ROUTES)
            .collect();
        if eligible.is_empty() {
            log::debug!(
                "attempt {attempt}: no pair above {MIN_GROUP_ROUTES} routes for {pattern:?}/{alliance:?}"
            );
            continue;
        }

        let pick = &eligible[rng.gen_range(0..eligible.len())];
        return Ok(CandidatePair {
            origin: pick.origin.clone(),
            destination: pick.destination.clone(),
            alliance,
        });
    }
    Err(ChallengeError::NoCandidateFound)
}
