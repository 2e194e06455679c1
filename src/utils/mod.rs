pub mod errors;
pub mod format;
pub mod math;

pub use errors::{PlayerError, PlayerResult};
pub use format::{format_duration, format_seconds};
pub use math::clamp_fraction;
