use std::time::Duration;

use crate::common::TestPlayer;
use crate::common::fixtures::source;
use crate::common::mocks::RendererCall;
use vidgo::models::SourceKind;
use vidgo::player::{PlaybackPhase, SeekTarget};

async fn loaded_player() -> TestPlayer {
    let mut player = TestPlayer::start(0.5).await;
    player
        .handle
        .add_source(source("movie", SourceKind::Local))
        .await
        .unwrap();
    player.next_set().await.succeed();
    player
        .handle
        .report_duration(Duration::from_secs(200))
        .unwrap();
    player
}

#[tokio::test(start_paused = true)]
async fn test_play_pause_toggle() {
    let player = loaded_player().await;

    player.handle.play().unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.phase,
        PlaybackPhase::Playing
    );

    player.handle.toggle_play_pause().unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.phase,
        PlaybackPhase::Paused
    );

    player.handle.toggle_play_pause().unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.phase,
        PlaybackPhase::Playing
    );
    assert_eq!(
        player
            .renderer
            .calls()
            .into_iter()
            .filter(|c| matches!(c, RendererCall::SetPlaying(_)))
            .collect::<Vec<_>>(),
        vec![
            RendererCall::SetPlaying(true),
            RendererCall::SetPlaying(false),
            RendererCall::SetPlaying(true),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_play_without_source_stays_idle() {
    let player = TestPlayer::start(0.5).await;

    player.handle.play().unwrap();
    player.handle.seek_to(0.5).unwrap();

    let snapshot = player.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.playback.phase, PlaybackPhase::Idle);
    assert_eq!(snapshot.playback.played_fraction, 0.0);
    assert!(player.renderer.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_seek_applies_immediately_and_clamps() {
    let player = loaded_player().await;

    for fraction in [0.0, 0.25, 0.5, 1.0] {
        player.handle.seek_to(fraction).unwrap();
        let snapshot = player.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.playback.played_fraction, fraction);
        assert_eq!(
            player.renderer.last_seek(),
            Some(SeekTarget::Fraction(fraction))
        );
    }

    player.handle.seek_to(1.5).unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.played_fraction,
        1.0
    );
    player.handle.seek_to(-0.5).unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.played_fraction,
        0.0
    );
}

#[tokio::test(start_paused = true)]
async fn test_progress_ignored_while_scrubbing() {
    let player = loaded_player().await;
    player.handle.play().unwrap();
    player.handle.report_progress(0.1, 0.3).unwrap();

    player.handle.begin_seek().unwrap();
    player.handle.seek_to(0.7).unwrap();
    player.handle.report_progress(0.11, 0.35).unwrap();
    player.handle.report_progress(0.12, 0.4).unwrap();

    let snapshot = player.handle.snapshot().await.unwrap();
    assert!(snapshot.playback.seeking);
    assert_eq!(snapshot.playback.played_fraction, 0.7);
    assert_eq!(snapshot.playback.buffered_fraction, 0.3);

    player.handle.end_seek().unwrap();
    player.handle.report_progress(0.71, 0.9).unwrap();
    let snapshot = player.handle.snapshot().await.unwrap();
    assert!(!snapshot.playback.seeking);
    assert_eq!(snapshot.playback.played_fraction, 0.71);
    assert_eq!(snapshot.playback.buffered_fraction, 0.9);
}

#[tokio::test(start_paused = true)]
async fn test_ended_needs_seek_before_play() {
    let player = loaded_player().await;
    player.handle.play().unwrap();
    player.handle.report_ended().unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.phase,
        PlaybackPhase::Ended
    );

    player.handle.play().unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.phase,
        PlaybackPhase::Ended
    );

    player.handle.scrub_to(0.2).unwrap();
    let snapshot = player.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.playback.phase, PlaybackPhase::Paused);
    assert_eq!(snapshot.playback.played_fraction, 0.2);

    player.handle.play().unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.phase,
        PlaybackPhase::Playing
    );
}

#[tokio::test(start_paused = true)]
async fn test_ended_arrives_from_any_phase() {
    let player = loaded_player().await;

    player.handle.report_ended().unwrap();
    assert_eq!(
        player.handle.snapshot().await.unwrap().playback.phase,
        PlaybackPhase::Ended
    );
}

#[tokio::test(start_paused = true)]
async fn test_skip_is_clamped_to_duration() {
    let player = loaded_player().await;

    player.renderer.set_current_time(195.0);
    player.handle.skip_forward().unwrap();
    player.handle.snapshot().await.unwrap();
    assert_eq!(player.renderer.last_seek(), Some(SeekTarget::Seconds(200.0)));

    player.renderer.set_current_time(4.0);
    player.handle.skip_backward().unwrap();
    player.handle.snapshot().await.unwrap();
    assert_eq!(player.renderer.last_seek(), Some(SeekTarget::Seconds(0.0)));

    player.renderer.set_current_time(50.0);
    player.handle.skip_by(-15.0).unwrap();
    let snapshot = player.handle.snapshot().await.unwrap();
    assert_eq!(player.renderer.last_seek(), Some(SeekTarget::Seconds(35.0)));
    assert!(!snapshot.playback.seeking);
}

#[tokio::test(start_paused = true)]
async fn test_duration_last_value_wins() {
    let player = loaded_player().await;

    player.handle.report_duration(Duration::from_secs(90)).unwrap();
    player
        .handle
        .report_duration(Duration::from_secs_f64(95.5))
        .unwrap();

    let snapshot = player.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.playback.duration_seconds, 95.5);
}

#[tokio::test(start_paused = true)]
async fn test_new_source_resets_and_does_not_autoplay() {
    let mut player = loaded_player().await;
    player.handle.play().unwrap();
    player.handle.report_progress(0.5, 0.8).unwrap();

    player
        .handle
        .add_source(source("next", SourceKind::Url))
        .await
        .unwrap();
    player.handle.remove_source("movie".into()).unwrap();
    player.next_set().await.succeed();

    let snapshot = player.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.playback.phase, PlaybackPhase::Idle);
    assert_eq!(snapshot.playback.played_fraction, 0.0);
    assert_eq!(snapshot.playback.buffered_fraction, 0.0);
    assert_eq!(snapshot.playback.duration_seconds, 0.0);
    assert_eq!(
        player.renderer.calls().last(),
        Some(&RendererCall::Load(
            "https://media.example.com/next.mp4".to_string()
        ))
    );
}
