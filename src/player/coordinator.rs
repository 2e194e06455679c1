//! Playback position and phase bookkeeping.
//!
//! The rendering engine reports progress on its own schedule while the user may
//! be dragging the seek bar. While a drag is in progress the user owns the
//! played fraction and engine progress is discarded, so the scrubber never
//! snaps back mid-drag.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

use super::traits::{MediaRenderer, SeekTarget};
use crate::models::VideoSource;
use crate::utils::clamp_fraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No source, or a source that has not been started yet
    Idle,
    Playing,
    Paused,
    /// Reached end of stream; only a seek or a new source leaves this phase
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    pub played_fraction: f64,
    pub buffered_fraction: f64,
    /// Total length in seconds, 0 while unknown
    pub duration_seconds: f64,
    pub seeking: bool,
}

impl PlaybackState {
    /// Controls may auto-hide only during uninterrupted playback.
    pub fn controls_may_hide(&self) -> bool {
        self.phase == PlaybackPhase::Playing && !self.seeking
    }

    pub fn position_seconds(&self) -> f64 {
        self.played_fraction * self.duration_seconds
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            played_fraction: 0.0,
            buffered_fraction: 0.0,
            duration_seconds: 0.0,
            seeking: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    PhaseChanged { from: PlaybackPhase, to: PlaybackPhase },
    ProgressUpdated { played: f64, buffered: f64 },
    DurationChanged(f64),
    SeekingChanged(bool),
    Seeked { fraction: f64 },
    Skipped { target_seconds: f64 },
    Reset,
}

pub struct PlaybackCoordinator {
    renderer: Arc<dyn MediaRenderer>,
    state: PlaybackState,
    loaded: bool,
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("state", &self.state)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl PlaybackCoordinator {
    pub fn new(renderer: Arc<dyn MediaRenderer>) -> Self {
        Self {
            renderer,
            state: PlaybackState::default(),
            loaded: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn has_source(&self) -> bool {
        self.loaded
    }

    /// Switch to a new active source (or none). Never starts playback.
    pub fn load_source(&mut self, source: Option<&VideoSource>) -> Vec<PlaybackEvent> {
        self.state = PlaybackState::default();
        self.loaded = source.is_some();

        match source {
            Some(source) => {
                debug!("Loading {} into renderer", source.url);
                self.renderer.load(&source.url);
            }
            None => {
                debug!("No active source, unloading renderer");
                self.renderer.unload();
            }
        }
        vec![PlaybackEvent::Reset]
    }

    pub fn play(&mut self) -> Vec<PlaybackEvent> {
        if !self.loaded {
            trace!("play ignored: no source loaded");
            return Vec::new();
        }
        match self.state.phase {
            PlaybackPhase::Idle | PlaybackPhase::Paused => {
                self.renderer.set_playing(true);
                self.set_phase(PlaybackPhase::Playing).into_iter().collect()
            }
            PlaybackPhase::Playing => Vec::new(),
            PlaybackPhase::Ended => {
                trace!("play ignored: playback ended, seek first");
                Vec::new()
            }
        }
    }

    pub fn pause(&mut self) -> Vec<PlaybackEvent> {
        if self.state.phase != PlaybackPhase::Playing {
            return Vec::new();
        }
        self.renderer.set_playing(false);
        self.set_phase(PlaybackPhase::Paused).into_iter().collect()
    }

    pub fn toggle_play(&mut self) -> Vec<PlaybackEvent> {
        if self.state.phase == PlaybackPhase::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Engine callback: end of stream.
    pub fn on_ended(&mut self) -> Vec<PlaybackEvent> {
        self.set_phase(PlaybackPhase::Ended).into_iter().collect()
    }

    /// Engine callback: periodic progress. Dropped while the user is seeking.
    pub fn on_progress(&mut self, played: f64, buffered: f64) -> Vec<PlaybackEvent> {
        if self.state.seeking {
            trace!("Discarding engine progress {:.3} during seek", played);
            return Vec::new();
        }
        self.state.played_fraction = clamp_fraction(played);
        self.state.buffered_fraction = clamp_fraction(buffered);
        vec![PlaybackEvent::ProgressUpdated {
            played: self.state.played_fraction,
            buffered: self.state.buffered_fraction,
        }]
    }

    /// Engine callback: duration estimate. Last value wins.
    pub fn on_duration(&mut self, seconds: f64) -> Vec<PlaybackEvent> {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.state.duration_seconds = seconds;
        vec![PlaybackEvent::DurationChanged(seconds)]
    }

    pub fn begin_seek(&mut self) -> Vec<PlaybackEvent> {
        self.set_seeking(true)
    }

    pub fn end_seek(&mut self) -> Vec<PlaybackEvent> {
        self.set_seeking(false)
    }

    /// User seek. The played fraction moves immediately; the engine catches up.
    pub fn seek_to(&mut self, fraction: f64) -> Vec<PlaybackEvent> {
        if !self.loaded {
            return Vec::new();
        }
        let fraction = clamp_fraction(fraction);
        self.state.played_fraction = fraction;
        self.renderer.seek(SeekTarget::Fraction(fraction));

        let mut events = vec![PlaybackEvent::Seeked { fraction }];
        events.extend(self.leave_ended());
        events
    }

    /// Jump relative to the engine's current time. Does not touch `seeking`.
    pub fn skip_by(&mut self, delta_seconds: f64) -> Vec<PlaybackEvent> {
        if !self.loaded {
            return Vec::new();
        }
        let current = self.renderer.current_time();
        let mut target = (current + delta_seconds).max(0.0);
        if self.state.duration_seconds > 0.0 {
            target = target.min(self.state.duration_seconds);
        }
        debug!("Skipping from {:.1}s to {:.1}s", current, target);
        self.renderer.seek(SeekTarget::Seconds(target));

        let mut events = vec![PlaybackEvent::Skipped {
            target_seconds: target,
        }];
        events.extend(self.leave_ended());
        events
    }

    fn leave_ended(&mut self) -> Option<PlaybackEvent> {
        if self.state.phase == PlaybackPhase::Ended {
            self.set_phase(PlaybackPhase::Paused)
        } else {
            None
        }
    }

    fn set_seeking(&mut self, seeking: bool) -> Vec<PlaybackEvent> {
        if self.state.seeking == seeking {
            return Vec::new();
        }
        self.state.seeking = seeking;
        vec![PlaybackEvent::SeekingChanged(seeking)]
    }

    fn set_phase(&mut self, to: PlaybackPhase) -> Option<PlaybackEvent> {
        let from = self.state.phase;
        if from == to {
            return None;
        }
        debug!("Playback phase {:?} -> {:?}", from, to);
        self.state.phase = to;
        Some(PlaybackEvent::PhaseChanged { from, to })
    }
}
