use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SourceId, VideoSource};
use crate::utils::{PlayerError, PlayerResult};

/// Notifications emitted by [`PlaylistStore`] mutations, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaylistEvent {
    SourceAdded(SourceId),
    SourceRemoved(SourceId),
    ActiveSourceChanged {
        previous: Option<SourceId>,
        current: Option<VideoSource>,
    },
}

/// Ordered set of video sources plus the currently active one.
///
/// `active_id`, when set, always names a member of `sources`.
#[derive(Debug, Clone, Default)]
pub struct PlaylistStore {
    sources: Vec<VideoSource>,
    active_id: Option<SourceId>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source. The first source added to an empty store becomes active.
    pub fn add(&mut self, source: VideoSource) -> PlayerResult<Vec<PlaylistEvent>> {
        if self.contains(&source.id) {
            return Err(PlayerError::DuplicateSource(source.id));
        }

        let was_empty = self.sources.is_empty();
        let id = source.id.clone();
        debug!("Adding source {} ({})", id, source.kind);
        self.sources.push(source);

        let mut events = vec![PlaylistEvent::SourceAdded(id.clone())];
        if was_empty {
            events.extend(self.set_active(Some(id)));
        }
        Ok(events)
    }

    /// Remove a source if present. Removing the active source hands activation to
    /// the first remaining source, or to none.
    pub fn remove(&mut self, id: &SourceId) -> Vec<PlaylistEvent> {
        let Some(index) = self.sources.iter().position(|s| &s.id == id) else {
            return Vec::new();
        };

        self.sources.remove(index);
        debug!("Removed source {}", id);

        let mut events = vec![PlaylistEvent::SourceRemoved(id.clone())];
        if self.active_id.as_ref() == Some(id) {
            let next = self.sources.first().map(|s| s.id.clone());
            events.extend(self.set_active(next));
        }
        events
    }

    /// Make `id` the active source.
    pub fn select(&mut self, id: &SourceId) -> PlayerResult<Vec<PlaylistEvent>> {
        if !self.contains(id) {
            return Err(PlayerError::SourceNotFound(id.clone()));
        }
        Ok(self.set_active(Some(id.clone())).into_iter().collect())
    }

    pub fn active(&self) -> Option<&VideoSource> {
        let id = self.active_id.as_ref()?;
        self.get(id)
    }

    pub fn active_id(&self) -> Option<&SourceId> {
        self.active_id.as_ref()
    }

    pub fn get(&self, id: &SourceId) -> Option<&VideoSource> {
        self.sources.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.get(id).is_some()
    }

    pub fn sources(&self) -> &[VideoSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn set_active(&mut self, id: Option<SourceId>) -> Option<PlaylistEvent> {
        if self.active_id == id {
            return None;
        }

        let previous = std::mem::replace(&mut self.active_id, id);
        let current = self.active().cloned();
        debug!(
            "Active source changed: {:?} -> {:?}",
            previous,
            current.as_ref().map(|s| &s.id)
        );
        Some(PlaylistEvent::ActiveSourceChanged { previous, current })
    }
}
