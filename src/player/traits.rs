use serde::{Deserialize, Serialize};

/// Where an imperative seek should land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeekTarget {
    /// Fraction of the total duration, in `[0, 1]`
    Fraction(f64),
    /// Absolute position in seconds
    Seconds(f64),
}

/// Imperative side of the media-rendering engine.
///
/// Every call is fire-and-forget: the engine may ignore a request (an unseekable
/// stream, an unreachable URL) and nothing is reported back. Progress, duration
/// and end-of-stream notifications flow the other way, through
/// [`PlayerHandle`](super::PlayerHandle).
pub trait MediaRenderer: Send + Sync {
    /// Start loading `url`, paused.
    fn load(&self, url: &str);
    /// Drop the current media.
    fn unload(&self);
    fn set_playing(&self, playing: bool);
    fn seek(&self, target: SeekTarget);
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
}
