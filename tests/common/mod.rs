pub mod fixtures;
pub mod mocks;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use vidgo::config::PlaybackConfig;
use vidgo::events::{EventBus, EventPayload, EventSubscriber};
use vidgo::player::{PlayerController, PlayerHandle};

use mocks::{GatedAudioControl, PendingSet, RecordingRenderer};

/// A running controller wired to test doubles.
pub struct TestPlayer {
    pub handle: PlayerHandle,
    pub events: EventSubscriber,
    pub renderer: Arc<RecordingRenderer>,
    pub audio: Arc<GatedAudioControl>,
    pub pending_sets: mpsc::UnboundedReceiver<PendingSet>,
}

impl TestPlayer {
    /// System volume starts at `initial_volume`.
    pub async fn start(initial_volume: f64) -> Self {
        let renderer = Arc::new(RecordingRenderer::default());
        let (audio, pending_sets) = GatedAudioControl::new(initial_volume);
        let event_bus = Arc::new(EventBus::new(256));
        let events = event_bus.subscribe();

        let (handle, controller) = PlayerController::new(
            &PlaybackConfig::default(),
            renderer.clone(),
            audio.clone(),
            event_bus,
        );
        tokio::spawn(controller.run());

        let player = Self {
            handle,
            events,
            renderer,
            audio,
            pending_sets,
        };
        settle().await;
        player
    }

    /// Next set-volume request the controller sent to the OS.
    pub async fn next_set(&mut self) -> PendingSet {
        tokio::time::timeout(Duration::from_secs(1), self.pending_sets.recv())
            .await
            .expect("no set-volume request was issued")
            .expect("audio control dropped")
    }

    /// Everything published so far, in order.
    pub fn drain_events(&mut self) -> Vec<EventPayload> {
        std::iter::from_fn(|| self.events.try_recv())
            .map(|event| event.payload)
            .collect()
    }
}

/// Let every spawned task run until it blocks. Needs a paused clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
