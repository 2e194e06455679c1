//! System volume synchronization.
//!
//! Local state is updated optimistically and the OS mixer is told afterwards.
//! Requests run as detached tasks and report back through a completion
//! channel, in whatever order the OS answers. Every set request carries a
//! version number; only a failure of the most recently issued request may roll
//! local state back. Superseded failures are dropped, so a slow failure never
//! clobbers a newer value.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use super::audio::{AudioControl, AudioResult};
use super::volume_resolver::resolve_volume;
use crate::models::VideoSource;
use crate::utils::clamp_fraction;

/// Volume shown before the OS has reported the real value.
pub const INITIAL_VOLUME: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeState {
    pub system_volume: f64,
    pub muted: bool,
    /// Version of the most recently issued set request.
    pub request_version: u64,
}

impl VolumeState {
    /// Value a volume slider should show: zero while muted.
    pub fn display_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.system_volume }
    }

    pub fn is_silent(&self) -> bool {
        self.muted || self.system_volume == 0.0
    }
}

impl Default for VolumeState {
    fn default() -> Self {
        Self {
            system_volume: INITIAL_VOLUME,
            muted: false,
            request_version: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeRequestKind {
    GetVolume,
    SetVolume,
    ToggleMute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VolumeEvent {
    VolumeChanged { volume: f64, muted: bool },
    MuteChanged(bool),
    RolledBack { version: u64, volume: f64, muted: bool },
    RequestFailed { request: VolumeRequestKind, error: String },
}

/// Result of a request that ran on a detached task.
#[derive(Debug)]
pub enum VolumeCompletion {
    SetVolume { version: u64, result: AudioResult<()> },
    ToggleMute { result: AudioResult<bool> },
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    volume: f64,
    muted: bool,
    mute_epoch: u64,
}

pub struct VolumeSynchronizer {
    audio: Arc<dyn AudioControl>,
    completions: mpsc::UnboundedSender<VolumeCompletion>,
    state: VolumeState,
    // State captured just before each in-flight set request was applied
    in_flight: HashMap<u64, Snapshot>,
    // Bumped whenever the OS reports a mute state
    mute_epoch: u64,
}

impl std::fmt::Debug for VolumeSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeSynchronizer")
            .field("state", &self.state)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl VolumeSynchronizer {
    pub fn new(
        audio: Arc<dyn AudioControl>,
        completions: mpsc::UnboundedSender<VolumeCompletion>,
    ) -> Self {
        Self {
            audio,
            completions,
            state: VolumeState::default(),
            in_flight: HashMap::new(),
            mute_epoch: 0,
        }
    }

    pub fn state(&self) -> VolumeState {
        self.state
    }

    /// Read the current OS volume once. Must complete before any mutation is issued.
    pub async fn mount(&mut self) -> Vec<VolumeEvent> {
        match self.audio.get_volume().await {
            Ok(volume) => {
                info!("Initial system volume: {:.2}", volume);
                self.state.system_volume = clamp_fraction(volume);
                vec![VolumeEvent::VolumeChanged {
                    volume: self.state.system_volume,
                    muted: self.state.muted,
                }]
            }
            Err(e) => {
                warn!("Failed to get system volume: {}", e);
                vec![VolumeEvent::RequestFailed {
                    request: VolumeRequestKind::GetVolume,
                    error: e.to_string(),
                }]
            }
        }
    }

    /// Push the preferred volume of a newly active source.
    pub fn activate(&mut self, source: &VideoSource) -> Vec<VolumeEvent> {
        let target = resolve_volume(source);
        debug!("Source {} ({}) wants volume {}", source.id, source.kind, target);
        self.issue_set(clamp_fraction(target), self.state.muted)
    }

    /// User volume change. Dragging to zero counts as muting.
    pub fn set_volume(&mut self, fraction: f64) -> Vec<VolumeEvent> {
        let volume = clamp_fraction(fraction);
        self.issue_set(volume, volume == 0.0)
    }

    /// Ask the OS to flip mute. State changes only when the answer arrives.
    pub fn toggle_mute(&mut self) {
        let audio = Arc::clone(&self.audio);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = audio.toggle_mute().await;
            let _ = completions.send(VolumeCompletion::ToggleMute { result });
        });
    }

    /// Fold a finished request back into local state.
    pub fn apply(&mut self, completion: VolumeCompletion) -> Vec<VolumeEvent> {
        match completion {
            VolumeCompletion::SetVolume { version, result } => {
                let snapshot = self.in_flight.remove(&version);
                match result {
                    Ok(()) => {
                        trace!("Volume request v{} confirmed", version);
                        Vec::new()
                    }
                    Err(e) if version == self.state.request_version => {
                        error!("Failed to set system volume (v{}): {}", version, e);
                        let mut events = Vec::new();
                        if let Some(previous) = snapshot {
                            self.state.system_volume = previous.volume;
                            // A mute answer applied since this request was issued wins
                            if previous.mute_epoch == self.mute_epoch {
                                self.state.muted = previous.muted;
                            }
                            events.push(VolumeEvent::RolledBack {
                                version,
                                volume: self.state.system_volume,
                                muted: self.state.muted,
                            });
                        }
                        events.push(VolumeEvent::RequestFailed {
                            request: VolumeRequestKind::SetVolume,
                            error: e.to_string(),
                        });
                        events
                    }
                    Err(e) => {
                        debug!(
                            "Ignoring failure of superseded volume request v{} (latest v{}): {}",
                            version, self.state.request_version, e
                        );
                        Vec::new()
                    }
                }
            }
            VolumeCompletion::ToggleMute { result } => match result {
                Ok(muted) => {
                    debug!("System mute is now {}", muted);
                    self.state.muted = muted;
                    self.mute_epoch += 1;
                    vec![VolumeEvent::MuteChanged(muted)]
                }
                Err(e) => {
                    warn!("Failed to toggle system mute: {}", e);
                    vec![VolumeEvent::RequestFailed {
                        request: VolumeRequestKind::ToggleMute,
                        error: e.to_string(),
                    }]
                }
            },
        }
    }

    fn issue_set(&mut self, volume: f64, muted: bool) -> Vec<VolumeEvent> {
        self.state.request_version += 1;
        let version = self.state.request_version;

        self.in_flight.insert(
            version,
            Snapshot {
                volume: self.state.system_volume,
                muted: self.state.muted,
                mute_epoch: self.mute_epoch,
            },
        );
        self.state.system_volume = volume;
        self.state.muted = muted;

        trace!("Issuing volume request v{}: {:.2}", version, volume);
        let audio = Arc::clone(&self.audio);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = audio.set_volume(volume).await;
            let _ = completions.send(VolumeCompletion::SetVolume { version, result });
        });

        vec![VolumeEvent::VolumeChanged { volume, muted }]
    }
}
