use vidgo::models::{SourceKind, VideoSource};

pub fn source(id: &str, kind: SourceKind) -> VideoSource {
    VideoSource::new(
        id,
        format!("Video {id}"),
        format!("https://media.example.com/{id}.mp4"),
        kind,
    )
}

pub fn source_with_volume(id: &str, volume: f64) -> VideoSource {
    source(id, SourceKind::Url).with_default_volume(volume)
}

/// Three plain url sources, "a", "b" and "c".
pub fn abc() -> Vec<VideoSource> {
    ["a", "b", "c"]
        .into_iter()
        .map(|id| source(id, SourceKind::Url))
        .collect()
}
