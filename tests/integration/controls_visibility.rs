use std::time::Duration;

use crate::common::fixtures::source;
use crate::common::{TestPlayer, settle};
use vidgo::events::EventPayload;
use vidgo::models::SourceKind;
use vidgo::player::VisibilityEvent;

async fn playing_player() -> TestPlayer {
    let mut player = TestPlayer::start(0.5).await;
    player
        .handle
        .add_source(source("clip", SourceKind::Url))
        .await
        .unwrap();
    player.next_set().await.succeed();
    player.handle.play().unwrap();
    settle().await;
    player
}

async fn controls_visible(player: &TestPlayer) -> bool {
    player.handle.snapshot().await.unwrap().controls_visible
}

fn controls_events(events: Vec<EventPayload>) -> Vec<VisibilityEvent> {
    events
        .into_iter()
        .filter_map(|payload| match payload {
            EventPayload::Controls(event) => Some(event),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_controls_hide_three_seconds_into_playback() {
    let mut player = playing_player().await;

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(controls_visible(&player).await);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!controls_visible(&player).await);
    assert_eq!(
        controls_events(player.drain_events()),
        vec![VisibilityEvent::ControlsHidden]
    );
}

#[tokio::test(start_paused = true)]
async fn test_activity_restarts_countdown() {
    let player = playing_player().await;

    tokio::time::sleep(Duration::from_secs(2)).await;
    player.handle.user_activity().unwrap();
    settle().await;

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(controls_visible(&player).await);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(!controls_visible(&player).await);
}

#[tokio::test(start_paused = true)]
async fn test_activity_while_hidden_shows_controls() {
    let mut player = playing_player().await;
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(!controls_visible(&player).await);

    player.handle.user_activity().unwrap();
    assert!(controls_visible(&player).await);
    assert_eq!(
        controls_events(player.drain_events()),
        vec![
            VisibilityEvent::ControlsHidden,
            VisibilityEvent::ControlsShown
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_paused_activity_never_hides() {
    let player = playing_player().await;
    player.handle.pause().unwrap();

    player.handle.user_activity().unwrap();
    settle().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(controls_visible(&player).await);

    // Resuming opens the gate again
    player.handle.play().unwrap();
    settle().await;
    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert!(!controls_visible(&player).await);
}

#[tokio::test(start_paused = true)]
async fn test_pausing_while_hidden_shows_controls() {
    let player = playing_player().await;
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(!controls_visible(&player).await);

    player.handle.pause().unwrap();
    assert!(controls_visible(&player).await);
}

#[tokio::test(start_paused = true)]
async fn test_scrubbing_holds_controls_open() {
    let player = playing_player().await;

    player.handle.begin_seek().unwrap();
    settle().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(controls_visible(&player).await);

    player.handle.seek_to(0.5).unwrap();
    player.handle.end_seek().unwrap();
    settle().await;
    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert!(!controls_visible(&player).await);
}

#[tokio::test(start_paused = true)]
async fn test_end_of_stream_keeps_controls() {
    let player = playing_player().await;

    player.handle.report_ended().unwrap();
    settle().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(controls_visible(&player).await);
}
