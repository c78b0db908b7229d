use game_types::{PlayerId, RoundScoreSet, Score, ValidationResult};
use std::collections::{BTreeMap, HashMap};

/// Points for a valid word nobody else submitted.
pub const UNIQUE_WORD_POINTS: u64 = 100;
/// Points for a valid word at least one other submission shares.
pub const REPEATED_WORD_POINTS: u64 = 50;

/// Counts describing a scored round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringSummary {
    pub valid: u64,
    pub repeats: u64,
    pub empty: u64,
    pub max_points: u64,
}

pub struct ScoringEngine;

impl ScoringEngine {
    /// Compute the points every player earned in one round.
    ///
    /// Every player in `players` is present in the result, in the given order,
    /// even with no submissions. Submitters missing from `players` are appended
    /// after them in order of first appearance.
    pub fn compute_round_scores(results: &[ValidationResult], players: &[PlayerId]) -> RoundScoreSet {
        let mut order: Vec<PlayerId> = Vec::with_capacity(players.len());
        let mut points: HashMap<PlayerId, u64> = HashMap::new();

        for player in players {
            if !points.contains_key(player) {
                points.insert(player.clone(), 0);
                order.push(player.clone());
            }
        }

        let occurrences = Self::count_valid_words(results);

        for result in results {
            let Some(key) = Self::word_key(result) else {
                continue;
            };

            let earned = match occurrences.get(&key) {
                Some(1) => UNIQUE_WORD_POINTS,
                _ => REPEATED_WORD_POINTS,
            };

            let entry = points.entry(result.submitter.clone()).or_insert_with(|| {
                order.push(result.submitter.clone());
                0
            });
            *entry += earned;
        }

        let scores = order
            .into_iter()
            .map(|player| {
                let total = points.get(&player).copied().unwrap_or(0);
                Score::new(player, total)
            })
            .collect();

        RoundScoreSet { scores }
    }

    /// Summarize a round: how many submissions were valid, repeated or empty,
    /// and the best single-submission award.
    pub fn summarize(results: &[ValidationResult]) -> ScoringSummary {
        let occurrences = Self::count_valid_words(results);
        let mut summary = ScoringSummary::default();

        for result in results {
            if result.word.trim().is_empty() {
                summary.empty += 1;
                continue;
            }

            let Some(key) = Self::word_key(result) else {
                continue;
            };

            summary.valid += 1;
            let earned = if occurrences.get(&key) == Some(&1) {
                UNIQUE_WORD_POINTS
            } else {
                summary.repeats += 1;
                REPEATED_WORD_POINTS
            };
            summary.max_points = summary.max_points.max(earned);
        }

        summary
    }

    /// Sum several rounds into per-player totals.
    pub fn cumulative<'a>(rounds: impl IntoIterator<Item = &'a RoundScoreSet>) -> BTreeMap<PlayerId, u64> {
        let mut totals = BTreeMap::new();
        for round in rounds {
            for score in &round.scores {
                *totals.entry(score.player.clone()).or_insert(0) += score.points;
            }
        }
        totals
    }

    fn count_valid_words(results: &[ValidationResult]) -> HashMap<String, usize> {
        let mut occurrences = HashMap::new();
        for key in results.iter().filter_map(Self::word_key) {
            *occurrences.entry(key).or_insert(0) += 1;
        }
        occurrences
    }

    /// Grouping key for a scoring submission; `None` when it scores nothing.
    fn word_key(result: &ValidationResult) -> Option<String> {
        let word = result.word.trim();
        if !result.is_valid || word.is_empty() {
            return None;
        }
        Some(word.to_lowercase())
    }
}
