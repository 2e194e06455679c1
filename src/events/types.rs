use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EventId, PlaylistEvent};
use crate::player::{PlaybackEvent, VisibilityEvent};
use crate::services::VolumeEvent;

/// Envelope for everything the player controller publishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEvent {
    pub id: EventId,
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

impl PlayerEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: EventId::generate(),
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

/// Component that produced an event, used for filtering and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Playlist,
    Playback,
    Volume,
    Controls,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playlist => "playlist",
            Self::Playback => "playback",
            Self::Volume => "volume",
            Self::Controls => "controls",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    Playlist(PlaylistEvent),
    Playback(PlaybackEvent),
    Volume(VolumeEvent),
    Controls(VisibilityEvent),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Playlist(_) => EventType::Playlist,
            Self::Playback(_) => EventType::Playback,
            Self::Volume(_) => EventType::Volume,
            Self::Controls(_) => EventType::Controls,
        }
    }
}

impl From<PlaylistEvent> for EventPayload {
    fn from(event: PlaylistEvent) -> Self {
        Self::Playlist(event)
    }
}

impl From<PlaybackEvent> for EventPayload {
    fn from(event: PlaybackEvent) -> Self {
        Self::Playback(event)
    }
}

impl From<VolumeEvent> for EventPayload {
    fn from(event: VolumeEvent) -> Self {
        Self::Volume(event)
    }
}

impl From<VisibilityEvent> for EventPayload {
    fn from(event: VisibilityEvent) -> Self {
        Self::Controls(event)
    }
}
