//! Layover Challenge Engine
//!
//! Platform-agnostic core for the Layover shortest-route guessing game: the
//! player names the hub airport(s) of the shortest itinerary between two
//! airports, scoped to one alliance and a fixed stop count. This crate owns
//! candidate sampling, tied-optimal shortest-set resolution, daily challenge
//! publication through a TTL cache, guess validation, and the client session
//! state machine. The path graph store, the cache backend, and session
//! persistence are supplied by the host through the traits below.

pub mod challenge;
pub mod engine;
pub mod guess;
pub mod memory;
pub mod path;
pub mod resolver;
pub mod sampler;
pub mod session;

use thiserror::Error;

// Re-export commonly used types
pub use challenge::{Challenge, ChallengeMode, ChallengeParams};
pub use engine::{ChallengeEngine, daily_cache_key, seconds_until_utc_midnight};
pub use guess::{Guess, validate_guess};
pub use memory::{MemoryChallengeCache, MemoryPathRepository, MemorySessionStorage};
pub use path::{
    Alliance, HubSequence, PairCandidate, PathRecord, RepositoryError, RouteQuery, StopPattern,
};
pub use resolver::{DISTANCE_EPSILON, ShortestSet, resolve_shortest_set};
pub use sampler::{CandidatePair, MAX_SAMPLE_ATTEMPTS, MIN_GROUP_ROUTES, sample_pair};
pub use session::{
    GameSession, HubFeedback, SessionKey, SessionSnapshot, SessionStatus, score_feedback,
};

/// Failure of a challenge request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// Sampling exhausted its attempt budget, or a sampled pair had no route
    /// rows left by resolution time. The caller may simply retry.
    #[error("no qualifying route pair found")]
    NoCandidateFound,
    /// A guess was submitted against an id this engine never minted.
    #[error("malformed challenge id: {0}")]
    InvalidChallengeId(String),
    /// Only one- and two-stop puzzles exist.
    #[error("unsupported stop count: {0}")]
    UnsupportedStopCount(u8),
    /// The backing store failed outside the sampler's retry loop.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The challenge cache was unreachable or refused the operation.
/// Always recoverable: the engine proceeds as if the cache were empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("challenge cache unavailable: {message}")]
pub struct CacheError {
    pub message: String,
}

impl CacheError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Read-only query surface over the precomputed path graph.
/// Platform-specific implementations should provide this.
pub trait PathRepository {
    /// Every route row matching the query, ordered by total distance
    /// ascending, truncated to the query limit when one is set.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the backing store is unreachable or
    /// the query fails; the store's own timeout policy applies, no retries
    /// happen at this layer.
    fn find_by_pair(&self, query: &RouteQuery) -> Result<Vec<PathRecord>, RepositoryError>;

    /// All (origin, destination) pairs under the given constraints with
    /// their route-variant counts.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the backing store is unreachable or
    /// the query fails.
    fn find_group_candidates(
        &self,
        pattern: StopPattern,
        alliance: Option<Alliance>,
    ) -> Result<Vec<PairCandidate>, RepositoryError>;
}

/// Shared key-value store with per-key expiry, used only to publish the
/// daily challenge. Platform-specific implementations should provide this.
pub trait ChallengeCache {
    /// Fetch a live (unexpired) value.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if the cache is unreachable; callers treat
    /// this as a miss.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store a value that expires `ttl_seconds` from now.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if the cache is unreachable; callers log and
    /// continue.
    fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<(), CacheError>;
}

/// Local persistence for daily-mode session resume, keyed per challenge per
/// UTC day. Platform-specific implementations should provide this.
pub trait SessionStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_session(&self, key: &SessionKey, snapshot: &SessionSnapshot)
    -> Result<(), Self::Error>;

    /// Load a previously persisted snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load_session(&self, key: &SessionKey) -> Result<Option<SessionSnapshot>, Self::Error>;

    /// Drop a snapshot (new practice game, day rollover).
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    fn delete_session(&self, key: &SessionKey) -> Result<(), Self::Error>;
}
