use chrono::{Duration, Utc};
use dashmap::DashMap;
use game_types::{CachedMatchScores, PlayerId, RoomId, RoundScoreSet, StoredRound};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const STORAGE_KEY_PREFIX: &str = "stop_match_scores_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("session storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Scoped, ephemeral string store (one per client session).
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage, dropped with the client.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: DashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Expiring, non-authoritative cache of round scores per room.
///
/// Every failure of the underlying storage is logged and treated as "nothing
/// cached"; no method of this type returns an error.
pub struct LocalFallbackStore {
    storage: Arc<dyn SessionStorage>,
    ttl: Duration,
}

impl LocalFallbackStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_ttl(storage, Duration::hours(24))
    }

    pub fn with_ttl(storage: Arc<dyn SessionStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn storage_key(room_id: RoomId) -> String {
        format!("{}{}", STORAGE_KEY_PREFIX, room_id)
    }

    /// Record one round's scores. Returns `false` when the round was already
    /// recorded (the write is skipped) or the storage refused it.
    pub fn store_round_scores(&self, room_id: RoomId, round_number: u32, scores: &RoundScoreSet) -> bool {
        let mut cached = self.get_stored_scores(room_id).unwrap_or(CachedMatchScores {
            room_id,
            rounds: Vec::new(),
            last_updated: 0,
        });

        if cached.has_round(round_number) {
            debug!("Round {} already cached for room {}, skipping", round_number, room_id);
            return false;
        }

        cached.rounds.push(StoredRound {
            round_number,
            scores: scores.to_map(),
        });
        cached.last_updated = Utc::now().timestamp_millis();

        let payload = match serde_json::to_string(&cached) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode cached scores for room {}: {}", room_id, e);
                return false;
            }
        };

        match self.storage.set(&Self::storage_key(room_id), payload) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to cache round {} for room {}: {}", round_number, room_id, e);
                false
            }
        }
    }

    /// Cached scores for a room, or `None` when absent, expired or unreadable.
    /// Expired and unreadable entries are purged.
    pub fn get_stored_scores(&self, room_id: RoomId) -> Option<CachedMatchScores> {
        let key = Self::storage_key(room_id);

        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read cached scores for room {}: {}", room_id, e);
                return None;
            }
        };

        let cached: CachedMatchScores = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Discarding unreadable cached scores for room {}: {}", room_id, e);
                self.purge(&key);
                return None;
            }
        };

        if self.is_expired(&cached) {
            debug!("Cached scores for room {} expired", room_id);
            self.purge(&key);
            return None;
        }

        Some(cached)
    }

    /// Per-player totals over rounds `<= up_to_round` (all rounds when `None`).
    /// Players never stored are omitted.
    pub fn get_cumulative_scores(&self, room_id: RoomId, up_to_round: Option<u32>) -> BTreeMap<PlayerId, u64> {
        let mut totals = BTreeMap::new();
        let Some(cached) = self.get_stored_scores(room_id) else {
            return totals;
        };

        for round in cached
            .rounds
            .iter()
            .filter(|round| up_to_round.is_none_or(|limit| round.round_number <= limit))
        {
            for (player, points) in &round.scores {
                *totals.entry(player.clone()).or_insert(0) += points;
            }
        }

        totals
    }

    pub fn clear_stored_scores(&self, room_id: RoomId) {
        self.purge(&Self::storage_key(room_id));
    }

    fn is_expired(&self, cached: &CachedMatchScores) -> bool {
        let age_ms = Utc::now().timestamp_millis() - cached.last_updated;
        age_ms > self.ttl.num_milliseconds()
    }

    fn purge(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!("Failed to remove cached scores {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::Score;

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable {
                reason: "private mode".to_string(),
            })
        }

        fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable {
                reason: "quota exceeded".to_string(),
            })
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable {
                reason: "private mode".to_string(),
            })
        }
    }

    fn round(scores: &[(&str, u64)]) -> RoundScoreSet {
        RoundScoreSet {
            scores: scores.iter().map(|(p, pts)| Score::new(*p, *pts)).collect(),
        }
    }

    fn store() -> (Arc<MemorySessionStorage>, LocalFallbackStore) {
        let storage = Arc::new(MemorySessionStorage::new());
        let store = LocalFallbackStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_second_write_for_same_round_is_ignored() {
        let (_, store) = store();
        let scores = round(&[("alice", 100), ("bob", 50)]);

        assert!(store.store_round_scores(1, 1, &scores));
        let before = store.get_cumulative_scores(1, None);

        assert!(!store.store_round_scores(1, 1, &scores));
        assert_eq!(store.get_cumulative_scores(1, None), before);
        assert_eq!(before.get("alice"), Some(&100));
    }

    #[test]
    fn test_cumulative_respects_round_limit() {
        let (_, store) = store();
        store.store_round_scores(9, 1, &round(&[("alice", 100)]));
        store.store_round_scores(9, 2, &round(&[("alice", 50), ("bob", 100)]));
        store.store_round_scores(9, 3, &round(&[("carol", 100)]));

        let up_to_two = store.get_cumulative_scores(9, Some(2));
        assert_eq!(up_to_two.get("alice"), Some(&150));
        assert_eq!(up_to_two.get("bob"), Some(&100));
        assert_eq!(up_to_two.get("carol"), None);

        let all = store.get_cumulative_scores(9, None);
        assert_eq!(all.get("carol"), Some(&100));
    }

    #[test]
    fn test_rooms_are_isolated() {
        let (_, store) = store();
        store.store_round_scores(1, 1, &round(&[("alice", 100)]));

        assert!(store.get_stored_scores(2).is_none());
        assert!(store.get_cumulative_scores(2, None).is_empty());
    }

    #[test]
    fn test_expired_entry_is_absent_and_purged() {
        let (storage, store) = store();
        let stale = CachedMatchScores {
            room_id: 4,
            rounds: vec![StoredRound {
                round_number: 1,
                scores: BTreeMap::from([("alice".to_string(), 100)]),
            }],
            last_updated: (Utc::now() - Duration::hours(25)).timestamp_millis(),
        };
        storage
            .set(
                &LocalFallbackStore::storage_key(4),
                serde_json::to_string(&stale).unwrap(),
            )
            .unwrap();

        assert!(store.get_stored_scores(4).is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_entry_inside_ttl_is_kept() {
        let (storage, store) = store();
        let recent = CachedMatchScores {
            room_id: 4,
            rounds: Vec::new(),
            last_updated: (Utc::now() - Duration::hours(23)).timestamp_millis(),
        };
        storage
            .set(
                &LocalFallbackStore::storage_key(4),
                serde_json::to_string(&recent).unwrap(),
            )
            .unwrap();

        assert_eq!(store.get_stored_scores(4), Some(recent));
    }

    #[test]
    fn test_unreadable_entry_degrades_to_absent() {
        let (storage, store) = store();
        storage
            .set(&LocalFallbackStore::storage_key(5), "{not json".to_string())
            .unwrap();

        assert!(store.get_stored_scores(5).is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clear_removes_room() {
        let (_, store) = store();
        store.store_round_scores(6, 1, &round(&[("alice", 100)]));

        store.clear_stored_scores(6);

        assert!(store.get_stored_scores(6).is_none());
    }

    #[test]
    fn test_storage_failures_are_absorbed() {
        let store = LocalFallbackStore::new(Arc::new(BrokenStorage));

        assert!(!store.store_round_scores(1, 1, &round(&[("alice", 100)])));
        assert!(store.get_stored_scores(1).is_none());
        assert!(store.get_cumulative_scores(1, None).is_empty());
        store.clear_stored_scores(1);
    }
}
