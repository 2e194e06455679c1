use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, trace};

use super::{AudioControl, AudioError, AudioResult};

const PACTL: &str = "pactl";
const OSASCRIPT: &str = "osascript";
const DEFAULT_SINK: &str = "@DEFAULT_SINK@";

/// Command-line tool used to reach the OS mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBackend {
    /// `pactl` against the default PulseAudio/PipeWire sink
    Pulse,
    /// `osascript` volume settings on macOS
    Osascript,
}

impl AudioBackend {
    /// Backend matching the platform the binary was built for, if any.
    pub fn for_current_platform() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(Self::Pulse)
        } else if cfg!(target_os = "macos") {
            Some(Self::Osascript)
        } else {
            None
        }
    }
}

/// [`AudioControl`] that shells out to the platform mixer tool.
#[derive(Debug, Clone)]
pub struct SystemAudioControl {
    backend: AudioBackend,
}

impl SystemAudioControl {
    pub fn new(backend: AudioBackend) -> Self {
        Self { backend }
    }

    pub fn for_current_platform() -> Option<Self> {
        AudioBackend::for_current_platform().map(Self::new)
    }

    pub fn backend(&self) -> AudioBackend {
        self.backend
    }

    async fn run(program: &str, args: &[&str]) -> AudioResult<String> {
        trace!("Running {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| AudioError::CommandFailed(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::CommandFailed(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| AudioError::Parse(format!("{} output is not UTF-8: {}", program, e)))
    }

    async fn osascript(script: &str) -> AudioResult<String> {
        Self::run(OSASCRIPT, &["-e", script]).await
    }
}

#[async_trait]
impl AudioControl for SystemAudioControl {
    async fn get_volume(&self) -> AudioResult<f64> {
        match self.backend {
            AudioBackend::Pulse => {
                let output = Self::run(PACTL, &["get-sink-volume", DEFAULT_SINK]).await?;
                parse_pactl_volume(&output)
            }
            AudioBackend::Osascript => {
                let output = Self::osascript("output volume of (get volume settings)").await?;
                parse_percent(&output)
            }
        }
    }

    async fn set_volume(&self, volume: f64) -> AudioResult<()> {
        let percent = volume_to_percent(volume);
        debug!("Setting system volume to {}%", percent);
        match self.backend {
            AudioBackend::Pulse => {
                let arg = format!("{}%", percent);
                Self::run(PACTL, &["set-sink-volume", DEFAULT_SINK, &arg]).await?;
            }
            AudioBackend::Osascript => {
                let script = format!("set volume output volume {}", percent);
                Self::osascript(&script).await?;
            }
        }
        Ok(())
    }

    async fn toggle_mute(&self) -> AudioResult<bool> {
        match self.backend {
            AudioBackend::Pulse => {
                Self::run(PACTL, &["set-sink-mute", DEFAULT_SINK, "toggle"]).await?;
                let output = Self::run(PACTL, &["get-sink-mute", DEFAULT_SINK]).await?;
                Ok(parse_pactl_mute(&output))
            }
            AudioBackend::Osascript => {
                let output = Self::osascript("output muted of (get volume settings)").await?;
                let muted = output.trim() == "true";
                let script = if muted {
                    "set volume with output unmuted"
                } else {
                    "set volume with output muted"
                };
                Self::osascript(script).await?;
                Ok(!muted)
            }
        }
    }
}

/// Clamp a volume fraction and convert it to a whole percentage.
pub fn volume_to_percent(volume: f64) -> u32 {
    if !volume.is_finite() {
        return 0;
    }
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Parse the first channel percentage out of `pactl get-sink-volume` output, e.g.
/// `Volume: front-left: 32768 /  50% / -18.06 dB, ...`.
pub fn parse_pactl_volume(output: &str) -> AudioResult<f64> {
    let percent_pos = output
        .find('%')
        .ok_or_else(|| AudioError::Parse(format!("no percentage in {:?}", output.trim())))?;
    let head = &output[..percent_pos];
    let start = head.rfind(char::is_whitespace).map(|i| i + 1).unwrap_or(0);
    parse_percent(&head[start..])
}

/// `pactl get-sink-mute` prints `Mute: yes` or `Mute: no`.
pub fn parse_pactl_mute(output: &str) -> bool {
    output.contains("yes")
}

fn parse_percent(value: &str) -> AudioResult<f64> {
    let value = value.trim();
    value
        .parse::<f64>()
        .map(|percent| percent / 100.0)
        .map_err(|e| AudioError::Parse(format!("{:?}: {}", value, e)))
}
