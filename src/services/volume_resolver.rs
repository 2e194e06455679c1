use crate::models::{SourceKind, VideoSource};

/// Volume used for kinds without a table entry.
pub const FALLBACK_VOLUME: f64 = 0.8;

/// Default system volume per source kind.
pub fn default_volume_for_kind(kind: SourceKind) -> f64 {
    match kind {
        SourceKind::Youtube => 0.7,
        SourceKind::Local => 0.8,
        SourceKind::Url => 0.8,
        SourceKind::Vimeo => 0.75,
        SourceKind::Twitch => 0.6,
        #[allow(unreachable_patterns)]
        _ => FALLBACK_VOLUME,
    }
}

/// Target system volume for a source.
///
/// An explicit `default_volume` wins and is returned as-is, even outside `[0, 1]`.
pub fn resolve_volume(source: &VideoSource) -> f64 {
    source
        .default_volume
        .unwrap_or_else(|| default_volume_for_kind(source.kind))
}
