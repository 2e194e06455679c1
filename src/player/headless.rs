//! A renderer without a screen.
//!
//! Keeps a simulated playhead that advances in real time while playing, and
//! turns it into the progress, duration and end-of-stream callbacks a real
//! engine would send.

use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, trace};

use super::controller::PlayerHandle;
use super::traits::{MediaRenderer, SeekTarget};

/// How far ahead of the playhead the simulated buffer runs.
const BUFFER_AHEAD_SECS: f64 = 30.0;

/// Callback a real engine would fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineReport {
    Duration(f64),
    Progress { played: f64, buffered: f64 },
    Ended,
}

#[derive(Debug, Default)]
struct HeadlessState {
    url: Option<String>,
    playing: bool,
    position: f64,
    duration_reported: bool,
}

#[derive(Debug)]
pub struct HeadlessRenderer {
    duration: f64,
    state: Mutex<HeadlessState>,
}

impl HeadlessRenderer {
    /// Every loaded source pretends to be `duration` long.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.as_secs_f64(),
            state: Mutex::new(HeadlessState::default()),
        }
    }

    pub fn loaded_url(&self) -> Option<String> {
        self.state.lock().unwrap().url.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    /// Move the playhead forward by `elapsed` and collect what the engine would report.
    pub fn advance(&self, elapsed: Duration) -> Vec<EngineReport> {
        let mut state = self.state.lock().unwrap();
        let mut reports = Vec::new();
        if state.url.is_none() {
            return reports;
        }

        if !state.duration_reported {
            state.duration_reported = true;
            reports.push(EngineReport::Duration(self.duration));
        }
        if !state.playing {
            return reports;
        }

        state.position = (state.position + elapsed.as_secs_f64()).min(self.duration);
        let played = if self.duration > 0.0 {
            state.position / self.duration
        } else {
            0.0
        };
        let buffered = if self.duration > 0.0 {
            ((state.position + BUFFER_AHEAD_SECS) / self.duration).min(1.0)
        } else {
            0.0
        };
        reports.push(EngineReport::Progress { played, buffered });

        if state.position >= self.duration {
            debug!("Headless playback reached the end");
            state.playing = false;
            reports.push(EngineReport::Ended);
        }
        reports
    }

    /// Drive the controller with simulated callbacks every `tick` until it goes away.
    pub async fn drive(&self, handle: PlayerHandle, tick: Duration) {
        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            for report in self.advance(tick) {
                let sent = match report {
                    EngineReport::Duration(seconds) => {
                        handle.report_duration(Duration::from_secs_f64(seconds))
                    }
                    EngineReport::Progress { played, buffered } => {
                        handle.report_progress(played, buffered)
                    }
                    EngineReport::Ended => handle.report_ended(),
                };
                if sent.is_err() {
                    debug!("Player controller gone, stopping headless engine");
                    return;
                }
            }
        }
    }
}

impl MediaRenderer for HeadlessRenderer {
    fn load(&self, url: &str) {
        info!("Headless renderer loading {}", url);
        let mut state = self.state.lock().unwrap();
        *state = HeadlessState {
            url: Some(url.to_string()),
            ..HeadlessState::default()
        };
    }

    fn unload(&self) {
        debug!("Headless renderer unloaded");
        *self.state.lock().unwrap() = HeadlessState::default();
    }

    fn set_playing(&self, playing: bool) {
        trace!("Headless renderer playing = {}", playing);
        self.state.lock().unwrap().playing = playing;
    }

    fn seek(&self, target: SeekTarget) {
        let position = match target {
            SeekTarget::Fraction(fraction) => fraction * self.duration,
            SeekTarget::Seconds(seconds) => seconds,
        };
        trace!("Headless renderer seeking to {:.1}s", position);
        self.state.lock().unwrap().position = position.clamp(0.0, self.duration);
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().position
    }
}
