mod identifiers;
pub mod playlist;
pub mod video_source;

pub use identifiers::{EventId, SourceId};
pub use playlist::{PlaylistEvent, PlaylistStore};
pub use video_source::{SourceKind, VideoSource};
