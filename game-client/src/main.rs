use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use game_client::handlers::LoggingEventHandler;
use game_client::watchers::watch_monthly_leaderboard;
use game_client::{Config, HttpMatchAuthority, MatchAuthority, MatchSession};
use game_core::{MatchEventBus, MemorySessionStorage, SessionStorage};
use game_types::RoomId;

const SCOREBOARD_REPORT_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting STOP match observer...");

    let config = Config::from_env()?;
    let room_id: RoomId = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ROOM_ID").ok())
        .context("usage: game-client <room-id> (or set ROOM_ID)")?
        .parse()
        .context("room id must be a number")?;

    info!("Using authority at {}", config.authority_url);
    let authority: Arc<dyn MatchAuthority> = Arc::new(HttpMatchAuthority::new(
        config.authority_url.clone(),
        config.session_token.clone(),
    ));
    let storage: Arc<dyn SessionStorage> = Arc::new(MemorySessionStorage::new());

    let mut bus = MatchEventBus::new();
    bus.add_handler(Box::new(LoggingEventHandler));

    let session = MatchSession::open(room_id, authority.clone(), storage, &config, bus)
        .context("could not open match session (is SESSION_TOKEN set?)")?;
    let (_leaderboard, mut leaderboard_rx) = watch_monthly_leaderboard(authority, &config)?;

    let mut report = tokio::time::interval(SCOREBOARD_REPORT_INTERVAL);
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            _ = report.tick() => {
                if session.is_stale() {
                    info!("Room {}: authority unreachable, showing last known scores", room_id);
                }
                for (rank, entry) in session.scoreboard().iter().enumerate() {
                    info!(
                        "#{} {} ({}){}: {} pts",
                        rank + 1,
                        entry.player_name,
                        entry.player,
                        if entry.is_current_user { " [you]" } else { "" },
                        entry.total_points
                    );
                }
            }
            changed = leaderboard_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let leaders = leaderboard_rx.borrow_and_update().value().cloned();
                if let Some(leaders) = leaders {
                    match leaders.iter().max_by_key(|row| row.points) {
                        Some(top) => info!(
                            "Monthly leaderboard: {} players, {} leads with {} pts",
                            leaders.len(),
                            top.user_id,
                            top.points
                        ),
                        None => info!("Monthly leaderboard is empty"),
                    }
                }
            }
        }
    }

    session.close();
    info!("Observer shutdown complete.");
    Ok(())
}
