use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{SourceId, SourceKind, VideoSource};
use crate::services::audio::{
    AudioBackend, AudioControl, MemoryAudioControl, SystemAudioControl,
};
use crate::utils::{PlayerError, PlayerResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub playlist: PlaylistConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seconds of inactivity before the controls hide during playback
    #[serde(default = "default_controls_timeout")]
    pub controls_timeout_secs: u64,

    /// Step used by skip forward/backward
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,
}

impl PlaybackConfig {
    pub fn controls_timeout(&self) -> Duration {
        Duration::from_secs(self.controls_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBackendChoice {
    /// Use the platform mixer tool if there is one, else keep volume in memory
    #[default]
    Auto,
    Pulse,
    Osascript,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub backend: AudioBackendChoice,
}

impl AudioConfig {
    pub fn create_control(&self) -> Arc<dyn AudioControl> {
        let backend = match self.backend {
            AudioBackendChoice::Auto => AudioBackend::for_current_platform(),
            AudioBackendChoice::Pulse => Some(AudioBackend::Pulse),
            AudioBackendChoice::Osascript => Some(AudioBackend::Osascript),
            AudioBackendChoice::Memory => None,
        };

        match backend {
            Some(backend) => {
                info!("Using system audio control ({:?})", backend);
                Arc::new(SystemAudioControl::new(backend))
            }
            None => {
                if self.backend == AudioBackendChoice::Auto {
                    warn!("No system audio control on this platform, volume stays in memory");
                }
                Arc::new(MemoryAudioControl::default())
            }
        }
    }
}

/// Sources added to the playlist at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    pub url: String,

    /// Detected from the url when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SourceKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_volume: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl SourceEntry {
    /// Entries without an id are numbered by position, starting at 1.
    pub fn to_source(&self, position: usize) -> VideoSource {
        let id = self
            .id
            .clone()
            .map(SourceId::new)
            .unwrap_or_else(|| SourceId::new((position + 1).to_string()));
        let kind = self.kind.unwrap_or_else(|| SourceKind::detect(&self.url));

        let mut source = VideoSource::new(id, self.title.clone(), self.url.clone(), kind);
        source.default_volume = self.default_volume;
        source.thumbnail = self.thumbnail.clone();
        source
    }
}

impl PlaylistConfig {
    pub fn to_sources(&self) -> Vec<VideoSource> {
        self.sources
            .iter()
            .enumerate()
            .map(|(position, entry)| entry.to_source(position))
            .collect()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, writing the defaults there first if the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {:?}", path);
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.validate()?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Reject values the player cannot run with
    pub fn validate(&self) -> PlayerResult<()> {
        if self.playback.controls_timeout_secs == 0 {
            return Err(PlayerError::Configuration(
                "playback.controls_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !self.playback.skip_seconds.is_finite() || self.playback.skip_seconds <= 0.0 {
            return Err(PlayerError::Configuration(format!(
                "playback.skip_seconds must be positive, got {}",
                self.playback.skip_seconds
            )));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("vidgo").join("config.toml"))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            controls_timeout_secs: default_controls_timeout(),
            skip_seconds: default_skip_seconds(),
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
        }
    }
}

// Default value functions
fn default_controls_timeout() -> u64 {
    3
}

fn default_skip_seconds() -> f64 {
    10.0
}

fn default_sources() -> Vec<SourceEntry> {
    const SAMPLE_BUCKET: &str = "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample";

    [
        ("1", "Big Buck Bunny", "BigBuckBunny.mp4", 0.2),
        ("2", "Elephant Dream", "ElephantsDream.mp4", 0.5),
        ("3", "Sintel", "Sintel.mp4", 0.8),
    ]
    .into_iter()
    .map(|(id, title, file, volume)| SourceEntry {
        id: Some(id.to_string()),
        title: title.to_string(),
        url: format!("{SAMPLE_BUCKET}/{file}"),
        kind: Some(SourceKind::Url),
        default_volume: Some(volume),
        thumbnail: None,
    })
    .collect()
}
