use tracing::{info, warn};

use game_core::{MatchEvent, MatchEventHandler};

/// Fire-and-forget side effect played when a player calls "STOP".
pub trait StopAnnouncer: Send + Sync {
    fn announce_stop(&self);
}

/// Announces through the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl StopAnnouncer for LogAnnouncer {
    fn announce_stop(&self) {
        info!("STOP!");
    }
}

/// Writes every match event to the log.
#[derive(Debug, Default)]
pub struct LoggingEventHandler;

impl MatchEventHandler for LoggingEventHandler {
    fn handle_event(&mut self, event: MatchEvent) {
        match event {
            MatchEvent::RevealStarted {
                room_id,
                round_number,
                letter,
            } => info!("Room {}: round {} revealing letter {}", room_id, round_number, letter),
            MatchEvent::RevealSettled {
                room_id,
                round_number,
                letter,
            } => match (round_number, letter) {
                (Some(round), Some(letter)) => {
                    info!("Room {}: round {} letter is {}", room_id, round, letter)
                }
                _ => info!("Room {}: reveal settled before the letter was confirmed", room_id),
            },
            MatchEvent::StateStale { room_id, error } => {
                warn!("Room {}: match state is stale: {}", room_id, error)
            }
            MatchEvent::RoundScored {
                room_id,
                round_number,
                scores,
            } => info!(
                "Room {}: round {} scored, {} points handed out",
                room_id,
                round_number,
                scores.total()
            ),
            event @ MatchEvent::MatchFinished { .. } => match event.winner() {
                Some(winner) => info!("Room {}: match finished, {} wins", event.room_id(), winner),
                None => info!("Room {}: match finished without a winner", event.room_id()),
            },
        }
    }
}
