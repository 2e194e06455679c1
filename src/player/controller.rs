use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use super::controls_visibility::VisibilityTimer;
use super::coordinator::{PlaybackCoordinator, PlaybackEvent, PlaybackState};
use super::traits::MediaRenderer;
use crate::config::PlaybackConfig;
use crate::events::{EventBus, EventPayload, EventSubscriber, PlayerEvent};
use crate::models::{PlaylistEvent, PlaylistStore, SourceId, VideoSource};
use crate::services::audio::AudioControl;
use crate::services::{VolumeCompletion, VolumeState, VolumeSynchronizer};
use crate::utils::{PlayerError, PlayerResult};

/// Commands that can be sent to the player controller
#[derive(Debug)]
pub enum PlayerCommand {
    /// Append a source to the playlist
    AddSource {
        source: VideoSource,
        respond_to: oneshot::Sender<PlayerResult<()>>,
    },
    /// Remove a source; absent ids are ignored
    RemoveSource { id: SourceId },
    /// Make a source the active one
    SelectSource {
        id: SourceId,
        respond_to: oneshot::Sender<PlayerResult<()>>,
    },
    Play,
    Pause,
    TogglePlayPause,
    /// User grabbed the seek bar
    BeginSeek,
    /// Seek to a fraction of the duration
    SeekTo { fraction: f64 },
    /// User released the seek bar
    EndSeek,
    /// Relative jump in seconds
    SkipBy { seconds: f64 },
    SkipForward,
    SkipBackward,
    /// Set volume (0.0 to 1.0)
    SetVolume { volume: f64 },
    ToggleMute,
    /// Pointer or keyboard activity over the player
    UserActivity,
    /// Engine progress callback
    EngineProgress { played: f64, buffered: f64 },
    /// Engine duration callback
    EngineDuration { seconds: f64 },
    /// Engine end-of-stream callback
    EngineEnded,
    /// Get a copy of the whole player state
    GetSnapshot {
        respond_to: oneshot::Sender<PlayerSnapshot>,
    },
}

/// Point-in-time view of everything the controller owns.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub sources: Vec<VideoSource>,
    pub active_id: Option<SourceId>,
    pub playback: PlaybackState,
    pub volume: VolumeState,
    pub controls_visible: bool,
}

impl PlayerSnapshot {
    pub fn active(&self) -> Option<&VideoSource> {
        let id = self.active_id.as_ref()?;
        self.sources.iter().find(|s| &s.id == id)
    }
}

/// Controller that owns the playlist, playback, volume and controls state and
/// processes commands one at a time
pub struct PlayerController {
    playlist: PlaylistStore,
    coordinator: PlaybackCoordinator,
    volume: VolumeSynchronizer,
    visibility: VisibilityTimer,
    skip_seconds: f64,

    receiver: mpsc::UnboundedReceiver<PlayerCommand>,
    completions: mpsc::UnboundedReceiver<VolumeCompletion>,
    expirations: mpsc::UnboundedReceiver<u64>,
    event_bus: Arc<EventBus>,

    // Last gate value handed to the visibility timer
    controls_may_hide: bool,
}

impl PlayerController {
    /// Create a new player controller with the given config
    pub fn new(
        config: &PlaybackConfig,
        renderer: Arc<dyn MediaRenderer>,
        audio: Arc<dyn AudioControl>,
        event_bus: Arc<EventBus>,
    ) -> (PlayerHandle, PlayerController) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let (expiry_tx, expirations) = mpsc::unbounded_channel();

        let controller = PlayerController {
            playlist: PlaylistStore::new(),
            coordinator: PlaybackCoordinator::new(renderer),
            volume: VolumeSynchronizer::new(audio, completion_tx),
            visibility: VisibilityTimer::new(config.controls_timeout(), expiry_tx),
            skip_seconds: config.skip_seconds,
            receiver,
            completions,
            expirations,
            event_bus: Arc::clone(&event_bus),
            controls_may_hide: false,
        };
        let handle = PlayerHandle { sender, event_bus };

        (handle, controller)
    }

    /// Run the controller event loop until every handle is dropped
    pub async fn run(mut self) {
        debug!("PlayerController event loop started");

        // Nothing may touch the volume before the OS has been asked for it
        let events = self.volume.mount().await;
        self.publish_all(events).await;

        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(completion) = self.completions.recv() => {
                    let events = self.volume.apply(completion);
                    self.publish_all(events).await;
                }
                Some(generation) = self.expirations.recv() => {
                    let event = self.visibility.on_expired(generation, self.controls_may_hide);
                    self.publish_all(event).await;
                }
            }
        }

        debug!("PlayerController event loop stopped");
    }

    async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::AddSource { source, respond_to } => {
                trace!("Adding source {}", source.id);
                let result = match self.playlist.add(source) {
                    Ok(events) => {
                        self.apply_playlist_events(events).await;
                        Ok(())
                    }
                    Err(e) => Err(e),
                };
                let _ = respond_to.send(result);
            }
            PlayerCommand::RemoveSource { id } => {
                trace!("Removing source {}", id);
                let events = self.playlist.remove(&id);
                self.apply_playlist_events(events).await;
            }
            PlayerCommand::SelectSource { id, respond_to } => {
                trace!("Selecting source {}", id);
                let result = match self.playlist.select(&id) {
                    Ok(events) => {
                        self.apply_playlist_events(events).await;
                        Ok(())
                    }
                    Err(e) => {
                        warn!("Cannot select source: {}", e);
                        Err(e)
                    }
                };
                let _ = respond_to.send(result);
            }
            PlayerCommand::Play => {
                let events = self.coordinator.play();
                self.apply_playback_events(events).await;
            }
            PlayerCommand::Pause => {
                let events = self.coordinator.pause();
                self.apply_playback_events(events).await;
            }
            PlayerCommand::TogglePlayPause => {
                let events = self.coordinator.toggle_play();
                self.apply_playback_events(events).await;
            }
            PlayerCommand::BeginSeek => {
                let events = self.coordinator.begin_seek();
                self.apply_playback_events(events).await;
            }
            PlayerCommand::SeekTo { fraction } => {
                trace!("Seeking to {:.3}", fraction);
                let events = self.coordinator.seek_to(fraction);
                self.apply_playback_events(events).await;
            }
            PlayerCommand::EndSeek => {
                let events = self.coordinator.end_seek();
                self.apply_playback_events(events).await;
            }
            PlayerCommand::SkipBy { seconds } => {
                let events = self.coordinator.skip_by(seconds);
                self.apply_playback_events(events).await;
            }
            PlayerCommand::SkipForward => {
                let events = self.coordinator.skip_by(self.skip_seconds);
                self.apply_playback_events(events).await;
            }
            PlayerCommand::SkipBackward => {
                let events = self.coordinator.skip_by(-self.skip_seconds);
                self.apply_playback_events(events).await;
            }
            PlayerCommand::SetVolume { volume } => {
                trace!("Setting volume to {:.2}", volume);
                let events = self.volume.set_volume(volume);
                self.publish_all(events).await;
            }
            PlayerCommand::ToggleMute => {
                trace!("Toggling mute");
                self.volume.toggle_mute();
            }
            PlayerCommand::UserActivity => {
                let event = self.visibility.notify_activity(self.controls_may_hide);
                self.publish_all(event).await;
            }
            PlayerCommand::EngineProgress { played, buffered } => {
                let events = self.coordinator.on_progress(played, buffered);
                self.apply_playback_events(events).await;
            }
            PlayerCommand::EngineDuration { seconds } => {
                let events = self.coordinator.on_duration(seconds);
                self.apply_playback_events(events).await;
            }
            PlayerCommand::EngineEnded => {
                info!("Playback reached end of stream");
                let events = self.coordinator.on_ended();
                self.apply_playback_events(events).await;
            }
            PlayerCommand::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
        }
    }

    async fn apply_playlist_events(&mut self, events: Vec<PlaylistEvent>) {
        for event in events {
            if let PlaylistEvent::ActiveSourceChanged { current, .. } = &event {
                let current = current.clone();
                self.publish(event).await;
                self.on_active_source_changed(current.as_ref()).await;
            } else {
                self.publish(event).await;
            }
        }
    }

    async fn on_active_source_changed(&mut self, source: Option<&VideoSource>) {
        match source {
            Some(source) => info!("Active source is now {} ({})", source.title, source.id),
            None => info!("Playlist is empty, no active source"),
        }

        let events = self.coordinator.load_source(source);
        self.apply_playback_events(events).await;

        if let Some(source) = source {
            let events = self.volume.activate(source);
            self.publish_all(events).await;
        }
    }

    async fn apply_playback_events(&mut self, events: Vec<PlaybackEvent>) {
        if events.is_empty() {
            return;
        }
        self.publish_all(events).await;

        let may_hide = self.coordinator.state().controls_may_hide();
        if may_hide != self.controls_may_hide {
            trace!("Controls auto-hide gate is now {}", may_hide);
            self.controls_may_hide = may_hide;
            let event = self.visibility.on_gate_changed(may_hide);
            self.publish_all(event).await;
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            sources: self.playlist.sources().to_vec(),
            active_id: self.playlist.active_id().cloned(),
            playback: self.coordinator.state(),
            volume: self.volume.state(),
            controls_visible: self.visibility.is_visible(),
        }
    }

    async fn publish(&self, payload: impl Into<EventPayload>) {
        self.event_bus.publish(PlayerEvent::new(payload.into())).await;
    }

    async fn publish_all<E: Into<EventPayload>>(&self, events: impl IntoIterator<Item = E>) {
        for event in events {
            self.publish(event).await;
        }
    }
}

/// Handle for communicating with the player controller
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    sender: mpsc::UnboundedSender<PlayerCommand>,
    event_bus: Arc<EventBus>,
}

impl PlayerHandle {
    fn send(&self, command: PlayerCommand) -> PlayerResult<()> {
        self.sender
            .send(command)
            .map_err(|_| PlayerError::Disconnected)
    }

    /// Add a source to the end of the playlist
    pub async fn add_source(&self, source: VideoSource) -> PlayerResult<()> {
        let (respond_to, response) = oneshot::channel();
        self.send(PlayerCommand::AddSource { source, respond_to })?;
        response.await.map_err(|_| PlayerError::Disconnected)?
    }

    pub fn remove_source(&self, id: SourceId) -> PlayerResult<()> {
        self.send(PlayerCommand::RemoveSource { id })
    }

    /// Select a source, failing if it is not in the playlist
    pub async fn select_source(&self, id: SourceId) -> PlayerResult<()> {
        let (respond_to, response) = oneshot::channel();
        self.send(PlayerCommand::SelectSource { id, respond_to })?;
        response.await.map_err(|_| PlayerError::Disconnected)?
    }

    pub fn play(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::Play)
    }

    pub fn pause(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::Pause)
    }

    pub fn toggle_play_pause(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::TogglePlayPause)
    }

    pub fn begin_seek(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::BeginSeek)
    }

    pub fn seek_to(&self, fraction: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::SeekTo { fraction })
    }

    pub fn end_seek(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::EndSeek)
    }

    /// Scrub gesture in one go: grab, move, release
    pub fn scrub_to(&self, fraction: f64) -> PlayerResult<()> {
        self.begin_seek()?;
        self.seek_to(fraction)?;
        self.end_seek()
    }

    pub fn skip_by(&self, seconds: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::SkipBy { seconds })
    }

    pub fn skip_forward(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::SkipForward)
    }

    pub fn skip_backward(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::SkipBackward)
    }

    /// Set volume (0.0 to 1.0)
    pub fn set_volume(&self, volume: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::SetVolume { volume })
    }

    pub fn toggle_mute(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::ToggleMute)
    }

    pub fn user_activity(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::UserActivity)
    }

    pub fn report_progress(&self, played: f64, buffered: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::EngineProgress { played, buffered })
    }

    pub fn report_duration(&self, duration: Duration) -> PlayerResult<()> {
        self.send(PlayerCommand::EngineDuration {
            seconds: duration.as_secs_f64(),
        })
    }

    pub fn report_ended(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::EngineEnded)
    }

    /// Get player state
    pub async fn snapshot(&self) -> PlayerResult<PlayerSnapshot> {
        let (respond_to, response) = oneshot::channel();
        self.send(PlayerCommand::GetSnapshot { respond_to })?;
        response.await.map_err(|_| PlayerError::Disconnected)
    }

    /// Subscribe to everything the controller publishes
    pub fn subscribe(&self) -> EventSubscriber {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }
}
