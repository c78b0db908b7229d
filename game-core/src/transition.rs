use game_types::{MatchState, TransitionEvent};
use tracing::debug;

/// Turns a stream of polled match states into one-shot round transitions.
///
/// Remembers the last (round, letter) pair it fired for. A state fires when
/// the round is active, has a letter, and differs from that pair in either
/// component.
#[derive(Debug, Default, Clone)]
pub struct RoundTransitionDetector {
    last_fired: Option<(u32, char)>,
}

impl RoundTransitionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, state: &MatchState) -> Option<TransitionEvent> {
        if !state.is_active {
            return None;
        }

        let letter = state.current_letter?;
        let key = (state.current_round, letter);

        if self.last_fired == Some(key) {
            return None;
        }

        debug!("Round {} became active with letter {}", key.0, key.1);
        self.last_fired = Some(key);
        Some(TransitionEvent {
            round_number: key.0,
            letter,
        })
    }

    pub fn last_fired(&self) -> Option<(u32, char)> {
        self.last_fired
    }

    /// Forget the remembered round, e.g. when a new match starts in the room.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
