//! In-memory implementations of the platform traits.
//!
//! These back the engine in tests and demos; real hosts supply a relational
//! store, a shared TTL cache, and browser storage through the same traits.
use chrono::{Duration, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::path::{Alliance, PairCandidate, PathRecord, RepositoryError, RouteQuery, StopPattern};
use crate::session::{SessionKey, SessionSnapshot};
use crate::{CacheError, ChallengeCache, PathRepository, SessionStorage};

/// A path repository over a plain vector of records.
#[derive(Debug, Clone, Default)]
pub struct MemoryPathRepository {
    records: Vec<PathRecord>,
}

impl MemoryPathRepository {
    #[must_use]
    pub fn new(records: Vec<PathRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: PathRecord) {
        self.records.push(record);
    }
}

impl PathRepository for MemoryPathRepository {
    fn find_by_pair(&self, query: &RouteQuery) -> Result<Vec<PathRecord>, RepositoryError> {
        let mut rows: Vec<PathRecord> = self
            .records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.total_distance.total_cmp(&b.total_distance));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn find_group_candidates(
        &self,
        pattern: StopPattern,
        alliance: Option<Alliance>,
    ) -> Result<Vec<PairCandidate>, RepositoryError> {
        let mut counts: HashMap<(String, String), usize> = HashMap::new();
        for record in &self.records {
            if record.pattern == pattern && record.alliance == alliance {
                *counts
                    .entry((record.origin.clone(), record.destination.clone()))
                    .or_default() += 1;
            }
        }
        let mut groups: Vec<PairCandidate> = counts
            .into_iter()
            .map(|((origin, destination), route_count)| PairCandidate {
                origin,
                destination,
                route_count,
            })
            .collect();
        // Deterministic order so seeded sampling is reproducible.
        groups.sort_by(|a, b| {
            (a.origin.as_str(), a.destination.as_str())
                .cmp(&(b.origin.as_str(), b.destination.as_str()))
        });
        Ok(groups)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    bytes: Vec<u8>,
    expires_at: chrono::DateTime<Utc>,
}

/// A TTL key-value cache backed by a shared map.
///
/// Clones share the same underlying map, mirroring how every engine instance
/// in production talks to the one shared cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryChallengeCache {
    entries: Rc<RefCell<HashMap<String, CacheEntry>>>,
}

impl MemoryChallengeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeCache for MemoryChallengeCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.entries.borrow_mut();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Utc::now() => Ok(Some(entry.bytes.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<(), CacheError> {
        let ttl = Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));
        self.entries.borrow_mut().insert(
            key.to_string(),
            CacheEntry {
                bytes: value.to_vec(),
                expires_at: Utc::now() + ttl,
            },
        );
        Ok(())
    }
}

/// Session persistence over a shared string-keyed map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    sessions: Rc<RefCell<HashMap<String, SessionSnapshot>>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    type Error = Infallible;

    fn save_session(
        &self,
        key: &SessionKey,
        snapshot: &SessionSnapshot,
    ) -> Result<(), Self::Error> {
        self.sessions
            .borrow_mut()
            .insert(key.storage_key(), snapshot.clone());
        Ok(())
    }

    fn load_session(&self, key: &SessionKey) -> Result<Option<SessionSnapshot>, Self::Error> {
        Ok(self.sessions.borrow().get(&key.storage_key()).cloned())
    }

    fn delete_session(&self, key: &SessionKey) -> Result<(), Self::Error> {
        self.sessions.borrow_mut().remove(&key.storage_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn one_stop(origin: &str, destination: &str, hub: &str, distance: f64) -> PathRecord {
        PathRecord {
            origin: origin.into(),
            destination: destination.into(),
            pattern: StopPattern::OneStop,
            hub1: hub.into(),
            hub2: None,
            alliance: None,
            total_distance: distance,
        }
    }

    #[test]
    fn find_by_pair_sorts_ascending_and_limits() {
        let repo = MemoryPathRepository::new(vec![
            one_stop("LHR", "SYD", "SIN", 10600.0),
            one_stop("LHR", "SYD", "DXB", 10300.0),
            one_stop("LHR", "SYD", "HKG", 11000.0),
        ]);
        let query = RouteQuery::pair("LHR", "SYD", StopPattern::OneStop, None).with_limit(2);
        let rows = repo.find_by_pair(&query).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hub1, "DXB");
        assert_eq!(rows[1].hub1, "SIN");
    }

    #[test]
    fn group_candidates_count_per_pair() {
        let repo = MemoryPathRepository::new(vec![
            one_stop("LHR", "SYD", "SIN", 10600.0),
            one_stop("LHR", "SYD", "DXB", 10300.0),
            one_stop("JFK", "HND", "ORD", 8200.0),
        ]);
        let groups = repo
            .find_group_candidates(StopPattern::OneStop, None)
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].origin, "JFK");
        assert_eq!(groups[0].route_count, 1);
        assert_eq!(groups[1].route_count, 2);
    }

    #[test]
    fn cache_honors_ttl_and_shares_across_clones() {
        let cache = MemoryChallengeCache::new();
        let clone = cache.clone();
        cache.set_with_expiry("k", b"payload", 3600).unwrap();
        assert_eq!(clone.get("k").unwrap().as_deref(), Some(&b"payload"[..]));

        cache.set_with_expiry("k", b"payload", 0).unwrap();
        assert_eq!(clone.get("k").unwrap(), None);
    }

    #[test]
    fn session_storage_roundtrip() {
        let storage = MemorySessionStorage::new();
        let key = SessionKey::new("1:LHR:SYD", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(storage.load_session(&key).unwrap(), None);

        let snapshot = SessionSnapshot {
            guesses: Vec::new(),
            hub_inputs: vec!["DX".to_string()],
        };
        storage.save_session(&key, &snapshot).unwrap();
        assert_eq!(storage.load_session(&key).unwrap(), Some(snapshot));

        storage.delete_session(&key).unwrap();
        assert_eq!(storage.load_session(&key).unwrap(), None);
    }
}
