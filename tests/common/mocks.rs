use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use vidgo::player::{MediaRenderer, SeekTarget};
use vidgo::services::audio::{AudioControl, AudioError, AudioResult};

/// A set-volume request held until the test answers it.
pub struct PendingSet {
    pub volume: f64,
    respond_to: oneshot::Sender<AudioResult<()>>,
}

impl PendingSet {
    pub fn succeed(self) {
        let _ = self.respond_to.send(Ok(()));
    }

    pub fn fail(self) {
        let _ = self
            .respond_to
            .send(Err(AudioError::CommandFailed("mixer busy".to_string())));
    }
}

/// Audio control whose set-volume calls block until the test releases them, so
/// responses can be delivered in any order.
pub struct GatedAudioControl {
    volume: Mutex<f64>,
    muted: AtomicBool,
    fail_mute: AtomicBool,
    pending: mpsc::UnboundedSender<PendingSet>,
}

impl GatedAudioControl {
    pub fn new(volume: f64) -> (Arc<Self>, mpsc::UnboundedReceiver<PendingSet>) {
        let (pending, rx) = mpsc::unbounded_channel();
        let control = Arc::new(Self {
            volume: Mutex::new(volume),
            muted: AtomicBool::new(false),
            fail_mute: AtomicBool::new(false),
            pending,
        });
        (control, rx)
    }

    pub fn fail_mute(&self, fail: bool) {
        self.fail_mute.store(fail, Ordering::SeqCst);
    }

    pub fn os_volume(&self) -> f64 {
        *self.volume.lock().unwrap()
    }

    pub fn os_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioControl for GatedAudioControl {
    async fn get_volume(&self) -> AudioResult<f64> {
        Ok(self.os_volume())
    }

    async fn set_volume(&self, volume: f64) -> AudioResult<()> {
        let (respond_to, response) = oneshot::channel();
        self.pending
            .send(PendingSet { volume, respond_to })
            .map_err(|_| AudioError::CommandFailed("test finished".to_string()))?;

        let result = response
            .await
            .map_err(|_| AudioError::CommandFailed("request dropped".to_string()))?;
        if result.is_ok() {
            *self.volume.lock().unwrap() = volume;
        }
        result
    }

    async fn toggle_mute(&self) -> AudioResult<bool> {
        if self.fail_mute.load(Ordering::SeqCst) {
            return Err(AudioError::CommandFailed("mute refused".to_string()));
        }
        Ok(!self.muted.fetch_xor(true, Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    Load(String),
    Unload,
    SetPlaying(bool),
    Seek(SeekTarget),
}

/// Renderer that records every imperative call.
#[derive(Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RendererCall>>,
    current_time: Mutex<f64>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RendererCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_seek(&self) -> Option<SeekTarget> {
        self.calls().into_iter().rev().find_map(|call| match call {
            RendererCall::Seek(target) => Some(target),
            _ => None,
        })
    }

    pub fn set_current_time(&self, seconds: f64) {
        *self.current_time.lock().unwrap() = seconds;
    }
}

impl MediaRenderer for RecordingRenderer {
    fn load(&self, url: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(RendererCall::Load(url.to_string()));
    }

    fn unload(&self) {
        self.calls.lock().unwrap().push(RendererCall::Unload);
    }

    fn set_playing(&self, playing: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(RendererCall::SetPlaying(playing));
    }

    fn seek(&self, target: SeekTarget) {
        self.calls.lock().unwrap().push(RendererCall::Seek(target));
    }

    fn current_time(&self) -> f64 {
        *self.current_time.lock().unwrap()
    }
}
