use crate::{Category, PlayerId, RoomId, Score, ScoringResult};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Far,
    Near,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: RoomId,
    pub categories: Vec<Category>,
    pub active: bool,
    pub host: PlayerId,
    pub mode: GameMode,
    pub players: Vec<PlayerId>,
}

/// Authoritative progress of the match running in a room.
///
/// Returned whole on every fetch; the authority never sends deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub current_round: u32,
    pub total_rounds: u32,
    #[serde(default)]
    pub current_letter: Option<char>,
    #[serde(default)]
    pub used_letters: Vec<char>,
    pub is_active: bool,
    #[serde(default)]
    pub cumulative_scores: Vec<Score>,
    #[serde(default)]
    pub last_round_scores: Option<ScoringResult>,
}

impl MatchState {
    pub fn round(&self) -> Round {
        Round {
            round_number: self.current_round,
            letter: self.current_letter,
            is_active: self.is_active,
        }
    }

    pub fn has_used(&self, letter: char) -> bool {
        self.used_letters.contains(&letter)
    }

    /// Players known to the authority through the cumulative score list.
    pub fn scored_players(&self) -> Vec<PlayerId> {
        self.cumulative_scores
            .iter()
            .map(|score| score.player.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_number: u32,
    pub letter: Option<char>,
    pub is_active: bool,
}

/// Response to a successful start-round mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoundPayload {
    pub round_number: u32,
    pub letter: char,
    pub total_rounds: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub submitter: PlayerId,
    pub category: Category,
    pub word: String,
    pub is_valid: bool,
}

/// A new round became active with a confirmed letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub round_number: u32,
    pub letter: char,
}
