//! OS-level audio control.
//!
//! The player never mixes audio itself. It asks the operating system to change
//! the master output volume and mute state through an [`AudioControl`]
//! implementation. All operations are asynchronous and may fail.

pub mod memory;
pub mod system;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryAudioControl;
pub use system::{AudioBackend, SystemAudioControl};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio command failed: {0}")]
    CommandFailed(String),

    #[error("Could not parse audio command output: {0}")]
    Parse(String),

    #[error("System audio control is not supported on this platform")]
    Unsupported,
}

pub type AudioResult<T> = std::result::Result<T, AudioError>;

#[async_trait]
pub trait AudioControl: Send + Sync {
    /// Current master output volume in `[0, 1]`.
    async fn get_volume(&self) -> AudioResult<f64>;

    /// Set the master output volume. Implementations clamp into `[0, 1]`.
    async fn set_volume(&self, volume: f64) -> AudioResult<()>;

    /// Flip the master mute switch and report the resulting state.
    async fn toggle_mute(&self) -> AudioResult<bool>;
}
