pub mod http;

pub use http::HttpMatchAuthority;

use async_trait::async_trait;
use game_types::{
    Category, MatchState, MonthlyScoreView, RemoteError, RoomId, RoomView, RoundPayload,
    ValidationResult,
};

/// The remote service that owns rooms, matches and scores.
///
/// Every call is a single request; failures come back as `RemoteError` and
/// are never retried here. Calls made without a session fail with
/// `RemoteError::SessionRequired` before anything is sent.
#[async_trait]
pub trait MatchAuthority: Send + Sync {
    fn has_session(&self) -> bool;

    async fn get_room(&self, room_id: RoomId) -> Result<RoomView, RemoteError>;

    async fn get_available_rooms(&self) -> Result<Vec<RoomView>, RemoteError>;

    async fn get_current_match_state(&self, room_id: RoomId) -> Result<MatchState, RemoteError>;

    async fn get_validation_results(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ValidationResult>, RemoteError>;

    async fn get_current_month_leaderboard(&self) -> Result<Vec<MonthlyScoreView>, RemoteError>;

    /// This month's leader, if anyone has scored yet.
    async fn get_current_top1(&self) -> Result<Option<MonthlyScoreView>, RemoteError>;

    async fn start_round(&self, room_id: RoomId) -> Result<RoundPayload, RemoteError>;

    /// Returns the authority's acknowledgement message.
    async fn stop_current_round(&self, room_id: RoomId) -> Result<String, RemoteError>;

    async fn submit_word(
        &self,
        room_id: RoomId,
        category: &Category,
        word: &str,
    ) -> Result<(), RemoteError>;
}
