
use game_client::Config;
use game_client::watchers::{watch_available_rooms, watch_monthly_leaderboard, watch_monthly_top1};
use game_types::RemoteError;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::*;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_lobby_watch_lists_rooms() {
    let authority = Arc::new(ScriptedAuthority::new());
    let (_handle, rx) = watch_available_rooms(authority, &Config::default()).unwrap();

    sleep(Duration::from_millis(10)).await;

    let snapshot = rx.borrow();
    let rooms = snapshot.value().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, TEST_ROOM);
}

#[tokio::test(start_paused = true)]
async fn test_leaderboard_watch_reports_rows() {
    let authority = Arc::new(ScriptedAuthority::new());
    let (_handle, rx) = watch_monthly_leaderboard(authority, &Config::default()).unwrap();

    sleep(Duration::from_millis(10)).await;

    let snapshot = rx.borrow();
    assert_eq!(snapshot.value().map(|rows| rows[0].points), Some(1200));
}

#[tokio::test(start_paused = true)]
async fn test_top1_watch_reports_leader() {
    let authority = Arc::new(ScriptedAuthority::new());
    let (_handle, rx) = watch_monthly_top1(authority, &Config::default()).unwrap();

    sleep(Duration::from_millis(10)).await;

    let snapshot = rx.borrow();
    let leader = snapshot.value().cloned().flatten().unwrap();
    assert_eq!(leader.user_id, "p1");
    assert_eq!(leader.points, 1200);
}

#[tokio::test]
async fn test_watchers_require_session() {
    let authority = Arc::new(ScriptedAuthority::without_session());

    assert_eq!(
        watch_available_rooms(authority.clone(), &Config::default()).err(),
        Some(RemoteError::SessionRequired)
    );
    assert_eq!(
        watch_monthly_leaderboard(authority.clone(), &Config::default()).err(),
        Some(RemoteError::SessionRequired)
    );
    assert_eq!(
        watch_monthly_top1(authority, &Config::default()).err(),
        Some(RemoteError::SessionRequired)
    );
}
