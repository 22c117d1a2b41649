//! Challenge publication and the request surface exposed to the UI layer.
//!
//! Practice challenges are generated fresh on every call. Daily challenges go
//! through a shared TTL cache keyed by (stop count, UTC date) so every player
//! sees the same puzzle until the next UTC midnight. Cache trouble is never
//! fatal: reads degrade to a miss, writes are logged and forgotten.
use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::cell::RefCell;

use crate::challenge::{Challenge, ChallengeMode, ChallengeParams};
use crate::guess::{Guess, validate_guess};
use crate::path::StopPattern;
use crate::resolver::resolve_shortest_set;
use crate::sampler::sample_pair;
use crate::{ChallengeCache, ChallengeError, PathRepository};

/// Cache key for the shared daily challenge.
#[must_use]
pub fn daily_cache_key(stop_count: u8, date: NaiveDate) -> String {
    format!("shortest_route_{stop_count}_{date}")
}

/// Seconds from `now` until the next UTC midnight, floored at one second.
#[must_use]
pub fn seconds_until_utc_midnight(now: DateTime<Utc>) -> u64 {
    let next_midnight = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc());
    match next_midnight {
        Some(midnight) => u64::try_from((midnight - now).num_seconds()).unwrap_or(1).max(1),
        // Unreachable this side of the calendar's end; degrade to a short TTL.
        None => 1,
    }
}

/// The challenge engine: sampler, resolver, publisher, and guess validator
/// behind one request surface.
///
/// Generic over the platform traits so hosts and tests can supply their own
/// backing store and cache; `cache: None` degrades daily mode to
/// always-generate-fresh.
pub struct ChallengeEngine<P, C>
where
    P: PathRepository,
    C: ChallengeCache,
{
    repository: P,
    cache: Option<C>,
    rng: RefCell<SmallRng>,
}

impl<P, C> ChallengeEngine<P, C>
where
    P: PathRepository,
    C: ChallengeCache,
{
    /// Engine with an entropy-seeded sampler.
    #[must_use]
    pub fn new(repository: P, cache: Option<C>) -> Self {
        Self {
            repository,
            cache,
            rng: RefCell::new(SmallRng::from_entropy()),
        }
    }

    /// Engine with a fixed sampling seed, for deterministic tests.
    #[must_use]
    pub fn with_seed(repository: P, cache: Option<C>, seed: u64) -> Self {
        Self {
            repository,
            cache,
            rng: RefCell::new(SmallRng::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn repository(&self) -> &P {
        &self.repository
    }

    /// Produce a challenge for the requested mode and stop count.
    ///
    /// # Errors
    ///
    /// [`ChallengeError::UnsupportedStopCount`] for counts other than 1 or 2,
    /// [`ChallengeError::NoCandidateFound`] when sampling exhausts its budget,
    /// and repository failures from the resolve step.
    pub fn get_challenge(
        &self,
        mode: ChallengeMode,
        stop_count: u8,
    ) -> Result<Challenge, ChallengeError> {
        self.get_challenge_at(mode, stop_count, Utc::now())
    }

    /// [`Self::get_challenge`] with an explicit clock, for tests.
    pub fn get_challenge_at(
        &self,
        mode: ChallengeMode,
        stop_count: u8,
        now: DateTime<Utc>,
    ) -> Result<Challenge, ChallengeError> {
        let pattern = StopPattern::from_stop_count(stop_count)
            .ok_or(ChallengeError::UnsupportedStopCount(stop_count))?;

        match mode {
            ChallengeMode::Practice => self.generate(pattern, mode),
            ChallengeMode::Daily => {
                let key = daily_cache_key(stop_count, now.date_naive());
                if let Some(cached) = self.read_cached(&key) {
                    return Ok(cached);
                }
                let challenge = self.generate(pattern, mode)?;
                self.publish(&key, &challenge, now);
                Ok(challenge)
            }
        }
    }

    /// Validate a player's hub guess for the identified challenge.
    ///
    /// The query constraints are re-derived from the id, so no server-side
    /// challenge registry is needed.
    ///
    /// # Errors
    ///
    /// [`ChallengeError::InvalidChallengeId`] when the id does not parse;
    /// everything else (unknown routes, store failures) is reported inside
    /// the returned [`Guess`].
    pub fn submit_guess(&self, challenge_id: &str, hubs: &[String]) -> Result<Guess, ChallengeError> {
        let params = ChallengeParams::parse(challenge_id)
            .ok_or_else(|| ChallengeError::InvalidChallengeId(challenge_id.to_string()))?;
        Ok(validate_guess(&self.repository, &params, hubs))
    }

    fn generate(
        &self,
        pattern: StopPattern,
        mode: ChallengeMode,
    ) -> Result<Challenge, ChallengeError> {
        let pair = {
            let mut rng = self.rng.borrow_mut();
            sample_pair(&self.repository, pattern, &mut *rng)?
        };
        let shortest = resolve_shortest_set(&self.repository, &pair, pattern)?;

        let params = ChallengeParams {
            origin: pair.origin.clone(),
            destination: pair.destination.clone(),
            pattern,
            alliance: pair.alliance,
        };
        Ok(Challenge {
            id: params.encode(),
            origin: pair.origin,
            destination: pair.destination,
            alliance: pair.alliance,
            stop_count: pattern.stop_count(),
            canonical_route: shortest.canonical_route,
            optimal_hub_sets: shortest.optimal_hub_sets,
            shortest_distance: shortest.shortest_distance,
            max_guesses: pattern.max_guesses(),
            mode,
        })
    }

    fn read_cached(&self, key: &str) -> Option<Challenge> {
        let cache = self.cache.as_ref()?;
        match cache.get(key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(challenge) => Some(challenge),
                Err(err) => {
                    log::warn!("cached challenge at {key} is unreadable, regenerating: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("challenge cache read failed for {key}, treating as miss: {err}");
                None
            }
        }
    }

    fn publish(&self, key: &str, challenge: &Challenge, now: DateTime<Utc>) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        // Two same-day misses can race here; last write wins and the key
        // stabilizes within the first requests after midnight. The caller
        // always gets the challenge it generated, cache health regardless.
        match serde_json::to_vec(challenge) {
            Ok(bytes) => {
                let ttl = seconds_until_utc_midnight(now);
                if let Err(err) = cache.set_with_expiry(key, &bytes, ttl) {
                    log::warn!("challenge cache write failed for {key}: {err}");
                }
            }
            Err(err) => log::warn!("challenge serialization failed for {key}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cache_key_embeds_stop_count_and_utc_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(daily_cache_key(2, date), "shortest_route_2_2025-03-14");
        assert_eq!(daily_cache_key(1, date), "shortest_route_1_2025-03-14");
    }

    #[test]
    fn ttl_runs_to_the_next_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 30).unwrap();
        assert_eq!(seconds_until_utc_midnight(now), 30);

        let midnight = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();
        assert_eq!(seconds_until_utc_midnight(midnight), 86_400);
    }
}
