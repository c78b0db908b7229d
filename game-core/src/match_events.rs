use game_types::{PlayerId, RemoteError, RoomId, RoundScoreSet, Score};

#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    RevealStarted {
        room_id: RoomId,
        round_number: u32,
        letter: char,
    },
    RevealSettled {
        room_id: RoomId,
        round_number: Option<u32>,
        letter: Option<char>,
    },
    StateStale {
        room_id: RoomId,
        error: RemoteError,
    },
    RoundScored {
        room_id: RoomId,
        round_number: u32,
        scores: RoundScoreSet,
    },
    MatchFinished {
        room_id: RoomId,
        final_scores: Vec<Score>,
    },
}

impl MatchEvent {
    pub fn room_id(&self) -> RoomId {
        match self {
            MatchEvent::RevealStarted { room_id, .. } => *room_id,
            MatchEvent::RevealSettled { room_id, .. } => *room_id,
            MatchEvent::StateStale { room_id, .. } => *room_id,
            MatchEvent::RoundScored { room_id, .. } => *room_id,
            MatchEvent::MatchFinished { room_id, .. } => *room_id,
        }
    }

    /// Winner of a finished match, if anyone scored.
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            MatchEvent::MatchFinished { final_scores, .. } => final_scores
                .iter()
                .filter(|score| score.points > 0)
                .fold(None::<&Score>, |best, score| match best {
                    Some(b) if b.points >= score.points => Some(b),
                    _ => Some(score),
                })
                .map(|score| &score.player),
            _ => None,
        }
    }
}

/// Event handler trait for processing match events
pub trait MatchEventHandler: Send {
    fn handle_event(&mut self, event: MatchEvent);
}

/// Simple event bus for distributing match events
pub struct MatchEventBus {
    handlers: Vec<Box<dyn MatchEventHandler>>,
}

impl MatchEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn MatchEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn publish(&mut self, event: MatchEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

impl Default for MatchEventBus {
    fn default() -> Self {
        Self::new()
    }
}
