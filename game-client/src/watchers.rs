use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use game_types::{MonthlyScoreView, RemoteError, RoomView};

use crate::config::Config;
use crate::poller::{PollHandle, PollKind, PollSnapshot, Poller};
use crate::remote::MatchAuthority;

pub type Watch<T> = (PollHandle<T>, watch::Receiver<PollSnapshot<T>>);

/// Keep the lobby's list of open rooms fresh.
pub fn watch_available_rooms(
    authority: Arc<dyn MatchAuthority>,
    config: &Config,
) -> Result<Watch<Vec<RoomView>>, RemoteError> {
    if !authority.has_session() {
        return Err(RemoteError::SessionRequired);
    }

    info!("Watching available rooms");
    Ok(Poller::spawn(
        PollKind::Lobby.label(),
        config.lobby_poll_interval,
        move || {
            let authority = authority.clone();
            async move { authority.get_available_rooms().await }
        },
    ))
}

pub fn watch_monthly_leaderboard(
    authority: Arc<dyn MatchAuthority>,
    config: &Config,
) -> Result<Watch<Vec<MonthlyScoreView>>, RemoteError> {
    if !authority.has_session() {
        return Err(RemoteError::SessionRequired);
    }

    info!("Watching the monthly leaderboard");
    Ok(Poller::spawn(
        PollKind::MonthlyLeaderboard.label(),
        config.leaderboard_poll_interval,
        move || {
            let authority = authority.clone();
            async move { authority.get_current_month_leaderboard().await }
        },
    ))
}

/// Keep this month's leader fresh, on the leaderboard's cadence.
pub fn watch_monthly_top1(
    authority: Arc<dyn MatchAuthority>,
    config: &Config,
) -> Result<Watch<Option<MonthlyScoreView>>, RemoteError> {
    if !authority.has_session() {
        return Err(RemoteError::SessionRequired);
    }

    Ok(Poller::spawn(
        PollKind::MonthlyTop1.label(),
        config.leaderboard_poll_interval,
        move || {
            let authority = authority.clone();
            async move { authority.get_current_top1().await }
        },
    ))
}
