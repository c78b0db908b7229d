use crate::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// One (player, points) pair. Used for the authority's cumulative list and
/// for locally computed round scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Score {
    pub player: PlayerId,
    pub points: u64,
}

impl Score {
    pub fn new(player: impl Into<PlayerId>, points: u64) -> Self {
        Self {
            player: player.into(),
            points,
        }
    }
}

/// The authority's summary of a scored round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub scores: Vec<Score>,
    pub valid: u64,
    pub repeats: u64,
    pub empty: u64,
    pub max_points: u64,
}

/// Points earned by each player in a single round, in player order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundScoreSet {
    pub scores: Vec<Score>,
}

impl RoundScoreSet {
    pub fn points_for(&self, player: &str) -> Option<u64> {
        self.scores
            .iter()
            .find(|score| score.player == player)
            .map(|score| score.points)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.scores.iter().map(|score| score.points).sum()
    }

    pub fn to_map(&self) -> BTreeMap<PlayerId, u64> {
        self.scores
            .iter()
            .map(|score| (score.player.clone(), score.points))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoredRound {
    pub round_number: u32,
    pub scores: BTreeMap<PlayerId, u64>,
}

/// Locally cached, non-authoritative round scores for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CachedMatchScores {
    pub room_id: RoomId,
    pub rounds: Vec<StoredRound>,
    /// Milliseconds since the Unix epoch.
    pub last_updated: i64,
}

impl CachedMatchScores {
    pub fn has_round(&self, round_number: u32) -> bool {
        self.rounds.iter().any(|r| r.round_number == round_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardEntry {
    pub player: PlayerId,
    pub player_name: String,
    pub total_points: u64,
    pub is_current_user: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score_set_lookup() {
        let set = RoundScoreSet {
            scores: vec![Score::new("alice", 100), Score::new("bob", 50)],
        };

        assert_eq!(set.points_for("alice"), Some(100));
        assert_eq!(set.points_for("carol"), None);
        assert_eq!(set.total(), 150);
        assert_eq!(set.to_map().get("bob"), Some(&50));
    }

    #[test]
    fn test_cached_scores_wire_format() {
        let cached = CachedMatchScores {
            room_id: 3,
            rounds: vec![StoredRound {
                round_number: 1,
                scores: BTreeMap::from([("alice".to_string(), 100)]),
            }],
            last_updated: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(json["roomId"], 3);
        assert_eq!(json["rounds"][0]["roundNumber"], 1);
        assert_eq!(json["rounds"][0]["scores"]["alice"], 100);
        assert_eq!(json["lastUpdated"], 1_700_000_000_000i64);
        assert!(cached.has_round(1));
        assert!(!cached.has_round(2));
    }
}
