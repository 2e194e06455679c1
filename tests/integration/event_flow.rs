use crate::common::fixtures::source_with_volume;
use crate::common::{TestPlayer, settle};
use vidgo::events::{EventPayload, EventType};
use vidgo::models::{PlaylistEvent, SourceId};
use vidgo::player::{PlaybackEvent, PlaybackPhase};
use vidgo::services::VolumeEvent;

#[tokio::test(start_paused = true)]
async fn test_first_source_event_order() {
    let mut player = TestPlayer::start(0.5).await;
    player.drain_events();

    let source = source_with_volume("a", 0.3);
    player.handle.add_source(source.clone()).await.unwrap();

    assert_eq!(
        player.drain_events(),
        vec![
            EventPayload::Playlist(PlaylistEvent::SourceAdded(SourceId::from("a"))),
            EventPayload::Playlist(PlaylistEvent::ActiveSourceChanged {
                previous: None,
                current: Some(source),
            }),
            EventPayload::Playback(PlaybackEvent::Reset),
            EventPayload::Volume(VolumeEvent::VolumeChanged {
                volume: 0.3,
                muted: false
            }),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_filtered_subscription_sees_only_playback() {
    let mut player = TestPlayer::start(0.5).await;
    let mut playback = player
        .handle
        .event_bus()
        .subscribe_to_types(vec![EventType::Playback]);

    player
        .handle
        .add_source(source_with_volume("a", 0.3))
        .await
        .unwrap();
    player.next_set().await.succeed();
    player.handle.play().unwrap();
    settle().await;

    let mut seen = Vec::new();
    while let Some(event) = playback.try_recv() {
        assert_eq!(event.event_type(), EventType::Playback);
        seen.push(event.payload);
    }
    assert_eq!(
        seen,
        vec![
            EventPayload::Playback(PlaybackEvent::Reset),
            EventPayload::Playback(PlaybackEvent::PhaseChanged {
                from: PlaybackPhase::Idle,
                to: PlaybackPhase::Playing
            }),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_history_and_stats_track_published_events() {
    let player = TestPlayer::start(0.5).await;
    player.handle.set_volume(0.6).unwrap();
    player.handle.snapshot().await.unwrap();

    let bus = player.handle.event_bus();
    let stats = bus.get_stats().await;
    // Mount plus the slider change
    assert_eq!(stats.events_by_type.get("volume"), Some(&2));
    assert_eq!(bus.get_history().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_serializes() {
    let player = TestPlayer::start(0.5).await;
    player
        .handle
        .add_source(source_with_volume("a", 0.3))
        .await
        .unwrap();

    let snapshot = player.handle.snapshot().await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["active_id"], "a");
    assert_eq!(json["playback"]["phase"], "Idle");
    assert_eq!(json["sources"][0]["kind"], "url");
    assert_eq!(json["controls_visible"], true);
}
