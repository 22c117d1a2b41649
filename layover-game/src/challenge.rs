//! Challenge model and the reversible challenge-id codec.
//! Id format: `<stops>:<origin>:<destination>[:<alliance code>]`, e.g.
//! `2:JFK:NRT:SA` or `1:LHR:SYD`.
use serde::{Deserialize, Serialize};

use crate::path::{Alliance, HubSequence, RouteQuery, StopPattern};

/// Whether a challenge is the shared daily puzzle or a private practice one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeMode {
    /// Cached and shared identically by all players for one UTC day.
    Daily,
    /// Private, regenerable on demand, never cached.
    Practice,
}

impl ChallengeMode {
    #[must_use]
    pub fn is_daily(self) -> bool {
        matches!(self, ChallengeMode::Daily)
    }
}

fn is_iata(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// The query constraints a challenge was generated under.
///
/// Encodes to and decodes from the challenge id, so guess validation can
/// re-derive its repository filters from the id alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeParams {
    pub origin: String,
    pub destination: String,
    pub pattern: StopPattern,
    pub alliance: Option<Alliance>,
}

impl ChallengeParams {
    /// Render the deterministic challenge id.
    #[must_use]
    pub fn encode(&self) -> String {
        match self.alliance {
            Some(alliance) => format!(
                "{}:{}:{}:{}",
                self.pattern.stop_count(),
                self.origin,
                self.destination,
                alliance.code()
            ),
            None => format!(
                "{}:{}:{}",
                self.pattern.stop_count(),
                self.origin,
                self.destination
            ),
        }
    }

    /// Parse a challenge id back into its query constraints.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        let mut parts = id.split(':');
        let stops: u8 = parts.next()?.parse().ok()?;
        let pattern = StopPattern::from_stop_count(stops)?;
        let origin = parts.next()?;
        let destination = parts.next()?;
        if !is_iata(origin) || !is_iata(destination) {
            return None;
        }
        let alliance = match (pattern, parts.next()) {
            // Two-stop ids always carry the alliance scope.
            (StopPattern::TwoStop, Some(code)) => Some(Alliance::from_code(code)?),
            (StopPattern::OneStop, None) => None,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            pattern,
            alliance,
        })
    }

    /// Repository query covering every route variant for these constraints.
    #[must_use]
    pub fn route_query(&self) -> RouteQuery {
        RouteQuery::pair(&self.origin, &self.destination, self.pattern, self.alliance)
    }
}

/// One puzzle instance, as returned to the session layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Deterministic id; see [`ChallengeParams::encode`].
    pub id: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub alliance: Option<Alliance>,
    pub stop_count: u8,
    /// Airport sequence of one arbitrarily chosen optimal route, origin and
    /// destination inclusive. Display feedback only, never win/loss.
    pub canonical_route: Vec<String>,
    /// Every hub sequence achieving `shortest_distance`. Complete tie set.
    pub optimal_hub_sets: Vec<HubSequence>,
    /// Minimum total distance in miles among matching routes.
    pub shortest_distance: f64,
    pub max_guesses: u8,
    pub mode: ChallengeMode,
}

impl Challenge {
    /// Re-derive the query constraints this challenge was generated under.
    /// `None` if the stop count is out of range (a challenge this engine
    /// never minted).
    #[must_use]
    pub fn params(&self) -> Option<ChallengeParams> {
        let pattern = StopPattern::from_stop_count(self.stop_count)?;
        Some(ChallengeParams {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            pattern,
            alliance: self.alliance,
        })
    }

    /// Hub slice of the canonical route (endpoints stripped).
    #[must_use]
    pub fn canonical_hubs(&self) -> &[String] {
        let len = self.canonical_route.len();
        if len < 3 {
            return &[];
        }
        &self.canonical_route[1..len - 1]
    }
}
