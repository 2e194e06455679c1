use async_trait::async_trait;
use std::sync::Mutex;

use super::{AudioControl, AudioResult};

/// In-process stand-in for the OS mixer, used where no system tool is available.
#[derive(Debug)]
pub struct MemoryAudioControl {
    state: Mutex<(f64, bool)>,
}

impl MemoryAudioControl {
    pub fn new(volume: f64) -> Self {
        Self {
            state: Mutex::new((volume.clamp(0.0, 1.0), false)),
        }
    }
}

impl Default for MemoryAudioControl {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[async_trait]
impl AudioControl for MemoryAudioControl {
    async fn get_volume(&self) -> AudioResult<f64> {
        Ok(self.state.lock().unwrap().0)
    }

    async fn set_volume(&self, volume: f64) -> AudioResult<()> {
        self.state.lock().unwrap().0 = volume.clamp(0.0, 1.0);
        Ok(())
    }

    async fn toggle_mute(&self) -> AudioResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.1 = !state.1;
        Ok(state.1)
    }
}
