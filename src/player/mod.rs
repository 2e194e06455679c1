pub mod controller;
pub mod controls_visibility;
pub mod coordinator;
pub mod headless;
pub mod traits;

pub use controller::{PlayerCommand, PlayerController, PlayerHandle, PlayerSnapshot};
pub use controls_visibility::{DEFAULT_CONTROLS_TIMEOUT, VisibilityEvent, VisibilityTimer};
pub use coordinator::{PlaybackCoordinator, PlaybackEvent, PlaybackPhase, PlaybackState};
pub use headless::{EngineReport, HeadlessRenderer};
pub use traits::{MediaRenderer, SeekTarget};
