use game_types::MatchState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    NotStarted,
    RoundActive,
    BetweenRounds,
    Finished,
}

/// Presentation-facing reading of an authoritative match state.
#[derive(Debug, Clone, Copy)]
pub struct MatchView<'a> {
    state: &'a MatchState,
}

impl<'a> MatchView<'a> {
    pub fn new(state: &'a MatchState) -> Self {
        Self { state }
    }

    pub fn phase(&self) -> MatchPhase {
        if self.state.is_active {
            MatchPhase::RoundActive
        } else if self.state.current_round == 0 {
            MatchPhase::NotStarted
        } else if self.state.current_round >= self.state.total_rounds {
            MatchPhase::Finished
        } else {
            MatchPhase::BetweenRounds
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == MatchPhase::Finished
    }

    pub fn can_start_round(&self) -> bool {
        self.state.current_round == 0
            || (!self.state.is_active && self.state.current_round < self.state.total_rounds)
    }

    pub fn can_stop_round(&self) -> bool {
        self.state.is_active && self.state.current_letter.is_some()
    }

    /// Letters of `alphabet` not yet drawn in this match.
    pub fn available_letters(&self, alphabet: &[char]) -> Vec<char> {
        alphabet
            .iter()
            .copied()
            .filter(|letter| !self.state.has_used(*letter))
            .collect()
    }

    pub fn rounds_remaining(&self) -> u32 {
        self.state.total_rounds.saturating_sub(self.state.current_round)
    }
}
