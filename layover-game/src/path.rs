//! Path-graph data model and repository query types.
//!
//! The path graph itself lives in an external store; this module only defines
//! the row shape and the parameters of the read-only queries the engine issues.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Hub codes stored inline; routes never have more than two hubs.
pub type HubSequence = SmallVec<[String; 2]>;

/// Number of intermediate hubs in a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPattern {
    /// Single hub between origin and destination.
    OneStop,
    /// Two hubs, scoped to one alliance.
    TwoStop,
}

impl StopPattern {
    /// Number of hubs a route with this pattern carries.
    #[must_use]
    pub const fn stop_count(self) -> u8 {
        match self {
            Self::OneStop => 1,
            Self::TwoStop => 2,
        }
    }

    /// Guess budget for puzzles with this pattern.
    #[must_use]
    pub const fn max_guesses(self) -> u8 {
        match self {
            Self::OneStop => 6,
            Self::TwoStop => 8,
        }
    }

    /// Map a requested stop count back to a pattern.
    #[must_use]
    pub const fn from_stop_count(count: u8) -> Option<Self> {
        match count {
            1 => Some(Self::OneStop),
            2 => Some(Self::TwoStop),
            _ => None,
        }
    }
}

/// One of the three mutually exclusive airline alliances.
///
/// Two-stop puzzles are scoped to a single alliance; one-stop puzzles are
/// alliance-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alliance {
    StarAlliance,
    OneWorld,
    SkyTeam,
}

impl Alliance {
    /// All alliances, in the order used for uniform sampling.
    pub const ALL: [Alliance; 3] = [Self::StarAlliance, Self::OneWorld, Self::SkyTeam];

    /// Short stable code used inside challenge ids.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StarAlliance => "SA",
            Self::OneWorld => "OW",
            Self::SkyTeam => "ST",
        }
    }

    /// Parse the short code produced by [`Alliance::code`].
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SA" => Some(Self::StarAlliance),
            "OW" => Some(Self::OneWorld),
            "ST" => Some(Self::SkyTeam),
            _ => None,
        }
    }
}

impl std::fmt::Display for Alliance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StarAlliance => write!(f, "Star Alliance"),
            Self::OneWorld => write!(f, "Oneworld"),
            Self::SkyTeam => write!(f, "SkyTeam"),
        }
    }
}

/// One precomputed route variant in the path graph.
///
/// Multiple records may exist for the same (origin, destination, pattern,
/// alliance) tuple with different hubs, and their distances need not be
/// unique; ties are expected, not exceptional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// 3-letter IATA code.
    pub origin: String,
    /// 3-letter IATA code.
    pub destination: String,
    pub pattern: StopPattern,
    pub hub1: String,
    /// Present only for two-stop routes.
    #[serde(default)]
    pub hub2: Option<String>,
    /// Present for two-stop routes, absent for one-stop.
    #[serde(default)]
    pub alliance: Option<Alliance>,
    /// Total route distance in miles.
    pub total_distance: f64,
}

impl PathRecord {
    /// The ordered hub sequence of this route.
    #[must_use]
    pub fn hubs(&self) -> HubSequence {
        let mut hubs = HubSequence::new();
        hubs.push(self.hub1.clone());
        if let Some(hub2) = &self.hub2 {
            hubs.push(hub2.clone());
        }
        hubs
    }

    /// Full airport sequence from origin to destination inclusive.
    #[must_use]
    pub fn full_route(&self) -> Vec<String> {
        let mut route = Vec::with_capacity(2 + self.pattern.stop_count() as usize);
        route.push(self.origin.clone());
        route.push(self.hub1.clone());
        if let Some(hub2) = &self.hub2 {
            route.push(hub2.clone());
        }
        route.push(self.destination.clone());
        route
    }
}

/// Parameters of a [`crate::PathRepository::find_by_pair`] query.
///
/// Results are always ordered by `total_distance` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
    pub pattern: StopPattern,
    pub alliance: Option<Alliance>,
    /// Exact ordered hub filter; `None` matches any hubs.
    #[serde(default)]
    pub hubs: Option<HubSequence>,
    /// Optional row limit applied after sorting.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RouteQuery {
    /// Query every route variant for an (origin, destination) pair.
    #[must_use]
    pub fn pair(
        origin: &str,
        destination: &str,
        pattern: StopPattern,
        alliance: Option<Alliance>,
    ) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            pattern,
            alliance,
            hubs: None,
            limit: None,
        }
    }

    /// Restrict the query to one exact hub sequence.
    #[must_use]
    pub fn with_hubs(mut self, hubs: HubSequence) -> Self {
        self.hubs = Some(hubs);
        self
    }

    /// Keep only the first `limit` rows after sorting.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a record satisfies every equality filter of this query.
    #[must_use]
    pub fn matches(&self, record: &PathRecord) -> bool {
        if record.origin != self.origin
            || record.destination != self.destination
            || record.pattern != self.pattern
            || record.alliance != self.alliance
        {
            return false;
        }
        match &self.hubs {
            Some(hubs) => record.hubs() == *hubs,
            None => true,
        }
    }
}

/// One (origin, destination) pair with its route-variant count, as returned
/// by [`crate::PathRepository::find_group_candidates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCandidate {
    pub origin: String,
    pub destination: String,
    /// Number of distinct route rows for this pair under the queried
    /// (pattern, alliance) constraints.
    pub route_count: usize,
}

/// Backing store unreachable or a query failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path repository query failed: {message}")]
pub struct RepositoryError {
    pub message: String,
}

impl RepositoryError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
