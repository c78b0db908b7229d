#![allow(dead_code)]

use game_core::{MatchEvent, MatchEventHandler};
use game_types::{MatchState, PlayerId, Score, ValidationResult};
use std::sync::{Arc, Mutex};

/// Creates `count` distinct player ids
pub fn create_players(count: usize) -> Vec<PlayerId> {
    (0..count).map(|i| format!("test-player-{}", i + 1)).collect()
}

/// Creates a validation result for a single submission
pub fn submission(player: &str, category: &str, word: &str, is_valid: bool) -> ValidationResult {
    ValidationResult {
        submitter: player.to_string(),
        category: category.to_string(),
        word: word.to_string(),
        is_valid,
    }
}

/// Creates an authoritative match state
pub fn create_match_state(round: u32, letter: Option<char>, is_active: bool, scores: &[(&str, u64)]) -> MatchState {
    MatchState {
        current_round: round,
        total_rounds: 10,
        current_letter: letter,
        used_letters: letter.into_iter().collect(),
        is_active,
        cumulative_scores: scores.iter().map(|(p, pts)| Score::new(*p, *pts)).collect(),
        last_round_scores: None,
    }
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<MatchEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_events(&self) -> Vec<MatchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl MatchEventHandler for EventCollector {
    fn handle_event(&mut self, event: MatchEvent) {
        self.events.lock().unwrap().push(event);
    }
}
