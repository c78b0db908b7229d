use crate::PlayerId;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One row of a monthly leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyScoreView {
    pub user_id: PlayerId,
    pub points: u64,
    pub wins: u64,
    pub rounds: u64,
    pub last_updated: u64, // authority time, nanoseconds
}
