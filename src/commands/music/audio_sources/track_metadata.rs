//! Defines the `TrackMetadata` struct, the immutable description of one queue
//! entry, and its conversion from `yt-dlp` JSON output.

use crate::commands::music::utils::music_manager::MusicError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything known about a resolved track.
///
/// `source_url` is the direct media URL handed back by the resolver. It is
/// resolved once at enqueue time and opened as a fresh audio input every time
/// the track is played.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// Direct, playable media URL.
    #[serde(rename = "url")]
    pub source_url: String,
    /// The page the track was resolved from (e.g. the YouTube watch page).
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Duration in whole seconds; `None` when the source does not report one.
    #[serde(default, deserialize_with = "seconds")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default, rename = "thumbnail")]
    pub thumbnail_url: Option<String>,
    /// The name of the user who requested the track.
    #[serde(skip)]
    pub requested_by: Option<String>,
}

/// yt-dlp reports durations as floats for some extractors.
fn seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|s| *s >= 0.0).map(|s| s.round() as u64))
}

impl TrackMetadata {
    /// Parses the output of `yt-dlp -J`. Playlists resolve to their first entry.
    pub fn from_ytdlp_json(json: &str, requested_by: Option<String>) -> Result<Self, MusicError> {
        let mut value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            MusicError::ResolutionFailed(format!("Failed to parse media metadata: {}", e))
        })?;

        if let Some(entries) = value.get_mut("entries") {
            value = entries
                .as_array_mut()
                .and_then(|entries| entries.drain(..).next())
                .ok_or_else(|| MusicError::ResolutionFailed("Playlist has no entries".into()))?;
        }

        let mut metadata: TrackMetadata = serde_json::from_value(value).map_err(|e| {
            MusicError::ResolutionFailed(format!("Unexpected media metadata: {}", e))
        })?;
        metadata.requested_by = requested_by;
        Ok(metadata)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration.map(Duration::from_secs)
    }

    /// Link to show users; falls back to the media URL itself.
    pub fn link(&self) -> &str {
        self.webpage_url.as_deref().unwrap_or(&self.source_url)
    }
}
