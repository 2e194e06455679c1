use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Default delay before idle controls hide during playback.
pub const DEFAULT_CONTROLS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityEvent {
    ControlsShown,
    ControlsHidden,
}

/// A pending hide. The generation tells a live expiry from a stale one.
#[derive(Debug)]
struct Countdown {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Control visibility state machine states
#[derive(Debug)]
enum ControlState {
    /// Controls are hidden
    Hidden,
    /// Controls are visible, optionally with a countdown to hide them
    Visible { countdown: Option<Countdown> },
}

/// Auto-hide timer for the playback controls overlay.
///
/// Hiding is allowed only while the caller-supplied gate holds (playing and not
/// seeking). Whenever the gate is closed the controls stay visible and no
/// countdown is pending. At most one countdown is live at a time.
#[derive(Debug)]
pub struct VisibilityTimer {
    state: ControlState,
    timeout: Duration,
    generation: u64,
    expirations: mpsc::UnboundedSender<u64>,
}

impl VisibilityTimer {
    /// Expiries are delivered as generation numbers on `expirations`; feed them back
    /// through [`VisibilityTimer::on_expired`].
    pub fn new(timeout: Duration, expirations: mpsc::UnboundedSender<u64>) -> Self {
        Self {
            state: ControlState::Visible { countdown: None },
            timeout,
            generation: 0,
            expirations,
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.state, ControlState::Hidden)
    }

    pub fn has_pending_countdown(&self) -> bool {
        matches!(
            self.state,
            ControlState::Visible {
                countdown: Some(_)
            }
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pointer or keyboard activity over the player.
    pub fn notify_activity(&mut self, may_hide: bool) -> Option<VisibilityEvent> {
        self.refresh(may_hide)
    }

    /// The playing/seeking gate changed.
    pub fn on_gate_changed(&mut self, may_hide: bool) -> Option<VisibilityEvent> {
        self.refresh(may_hide)
    }

    /// A countdown fired. Ignored unless it is the live one and hiding is still allowed.
    pub fn on_expired(&mut self, generation: u64, may_hide: bool) -> Option<VisibilityEvent> {
        let live = matches!(
            &self.state,
            ControlState::Visible { countdown: Some(c) } if c.generation == generation
        );
        if !live {
            trace!("Ignoring stale controls countdown #{}", generation);
            return None;
        }
        if !may_hide {
            self.state = ControlState::Visible { countdown: None };
            return None;
        }

        debug!("Hiding controls after {:?} of inactivity", self.timeout);
        self.state = ControlState::Hidden;
        Some(VisibilityEvent::ControlsHidden)
    }

    fn refresh(&mut self, may_hide: bool) -> Option<VisibilityEvent> {
        let was_hidden = !self.is_visible();
        self.cancel_countdown();

        let countdown = may_hide.then(|| self.arm());
        self.state = ControlState::Visible { countdown };

        was_hidden.then_some(VisibilityEvent::ControlsShown)
    }

    fn arm(&mut self) -> Countdown {
        self.generation += 1;
        let generation = self.generation;
        let timeout = self.timeout;
        let expirations = self.expirations.clone();

        trace!("Arming controls countdown #{} ({:?})", generation, timeout);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = expirations.send(generation);
        });
        Countdown { generation, handle }
    }

    fn cancel_countdown(&mut self) {
        if let ControlState::Visible { countdown } = &mut self.state
            && let Some(countdown) = countdown.take()
        {
            countdown.handle.abort();
        }
    }
}

impl Drop for VisibilityTimer {
    fn drop(&mut self) {
        self.cancel_countdown();
    }
}
