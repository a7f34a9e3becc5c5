//! Track summary - display-only catalog metadata

use serde::{Deserialize, Serialize};

/// Catalog metadata for a track, as returned by search and carried on queue
/// items. Purely informational; the coordination engine never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    /// Catalog identifier understood by the playback engine
    pub track_id: String,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    pub duration_seconds: u32,
}

impl TrackSummary {
    pub fn new(
        track_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_seconds: u32,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork_url: None,
            duration_seconds,
        }
    }

    /// Attach an artwork URL
    #[must_use]
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }
}
