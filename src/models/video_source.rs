use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use super::SourceId;

/// Origin category of a video, used to pick a default system volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Youtube,
    Local,
    Url,
    Vimeo,
    Twitch,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Local => "local",
            Self::Url => "url",
            Self::Vimeo => "vimeo",
            Self::Twitch => "twitch",
        }
    }

    /// Guess the kind of a source from its location.
    ///
    /// Parseable URLs are classified by scheme and host. Anything else falls back
    /// to plain substring matching on the raw string.
    pub fn detect(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) => Self::detect_parsed(&url),
            Err(_) => Self::detect_raw(location),
        }
    }

    fn detect_parsed(url: &Url) -> Self {
        if url.scheme() == "file" {
            return Self::Local;
        }

        let Some(host) = url.host_str().map(|h| h.to_ascii_lowercase()) else {
            return Self::Url;
        };
        let is_host = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));

        if is_host("youtube.com") || is_host("youtu.be") {
            Self::Youtube
        } else if is_host("vimeo.com") {
            Self::Vimeo
        } else if is_host("twitch.tv") {
            Self::Twitch
        } else if host == "localhost" {
            Self::Local
        } else {
            Self::Url
        }
    }

    fn detect_raw(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.contains("youtube.com") || lower.contains("youtu.be") {
            Self::Youtube
        } else if lower.contains("vimeo.com") {
            Self::Vimeo
        } else if lower.contains("twitch.tv") {
            Self::Twitch
        } else if lower.starts_with("file://") || lower.contains("localhost") {
            Self::Local
        } else {
            Self::Url
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable entry of the playlist. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    pub id: SourceId,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Preferred system volume for this source. Not clamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_volume: Option<f64>,
    pub kind: SourceKind,
}

impl VideoSource {
    pub fn new(
        id: impl Into<SourceId>,
        title: impl Into<String>,
        url: impl Into<String>,
        kind: SourceKind,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            thumbnail: None,
            default_volume: None,
            kind,
        }
    }

    /// Build a source with a freshly generated id and a kind detected from `url`.
    pub fn from_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = SourceKind::detect(&url);
        Self::new(SourceId::generate(), title, url, kind)
    }

    pub fn with_default_volume(mut self, volume: f64) -> Self {
        self.default_volume = Some(volume);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}
