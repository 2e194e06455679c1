pub mod audio;
pub mod volume_resolver;
pub mod volume_sync;

pub use audio::{AudioControl, AudioError, MemoryAudioControl, SystemAudioControl};
pub use volume_resolver::resolve_volume;
pub use volume_sync::{
    VolumeCompletion, VolumeEvent, VolumeRequestKind, VolumeState, VolumeSynchronizer,
};
