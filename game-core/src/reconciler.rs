use game_types::{PlayerId, Score, ScoreboardEntry};
use std::collections::BTreeMap;

/// Where a set of displayed scores came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Authoritative,
    LocalCache,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledScores {
    pub source: ScoreSource,
    pub scores: Vec<Score>,
}

impl ReconciledScores {
    pub fn empty() -> Self {
        Self {
            source: ScoreSource::Empty,
            scores: Vec::new(),
        }
    }
}

/// Combines the authority's cumulative scores with the local fallback cache.
///
/// Precedence is strict: whenever the authority has answered, its list is
/// used as-is and the cache is ignored, even when the two disagree.
pub struct ScoreReconciler;

impl ScoreReconciler {
    pub fn get_player_score(cumulative: &[Score], player: &str) -> u64 {
        cumulative
            .iter()
            .find(|score| score.player == player)
            .map(|score| score.points)
            .unwrap_or(0)
    }

    /// Pair each player with their score, highest first. Ties keep the order
    /// of `players`.
    pub fn sort_players_by_score(players: &[PlayerId], cumulative: &[Score]) -> Vec<(PlayerId, u64)> {
        let mut ranked: Vec<(PlayerId, u64)> = players
            .iter()
            .map(|player| (player.clone(), Self::get_player_score(cumulative, player)))
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn normalize(cumulative: &[Score]) -> BTreeMap<PlayerId, u64> {
        cumulative
            .iter()
            .map(|score| (score.player.clone(), score.points))
            .collect()
    }

    pub fn reconcile(
        authoritative: Option<&[Score]>,
        cached: Option<&BTreeMap<PlayerId, u64>>,
    ) -> ReconciledScores {
        if let Some(scores) = authoritative {
            return ReconciledScores {
                source: ScoreSource::Authoritative,
                scores: scores.to_vec(),
            };
        }

        match cached {
            Some(cached) if !cached.is_empty() => ReconciledScores {
                source: ScoreSource::LocalCache,
                scores: cached
                    .iter()
                    .map(|(player, points)| Score::new(player.clone(), *points))
                    .collect(),
            },
            _ => ReconciledScores::empty(),
        }
    }

    /// Build display rows for the room's players, ranked by reconciled score.
    /// Names follow seat order ("Player 1" is the first player in `players`).
    pub fn scoreboard(
        players: &[PlayerId],
        reconciled: &ReconciledScores,
        current_user: Option<&str>,
    ) -> Vec<ScoreboardEntry> {
        let mut entries: Vec<ScoreboardEntry> = players
            .iter()
            .enumerate()
            .map(|(seat, player)| ScoreboardEntry {
                player: player.clone(),
                player_name: format!("Player {}", seat + 1),
                total_points: Self::get_player_score(&reconciled.scores, player),
                is_current_user: current_user == Some(player.as_str()),
            })
            .collect();

        entries.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        entries
    }
}
