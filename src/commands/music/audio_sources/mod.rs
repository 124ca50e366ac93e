//! Media resolution: turning a URL or free-text query into a playable track.

/// Submodule defining the `TrackMetadata` struct used across the music commands.
pub mod track_metadata;
/// Submodule implementing `MediaResolver` on top of the `yt-dlp` CLI.
pub mod youtube;

use crate::commands::music::utils::music_manager::MusicError;
use serenity::async_trait;
use url::Url;

pub use track_metadata::TrackMetadata;
pub use youtube::YtDlpResolver;

/// Resolves a URL or search query into a track.
///
/// Implementations may take seconds and must not block the runtime.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Resolves `query` into the metadata and stream URL of a single track.
    ///
    /// Playlists resolve to their first entry. Any failure is reported as
    /// `MusicError::ResolutionFailed`.
    async fn resolve(
        &self,
        query: &str,
        requested_by: Option<String>,
    ) -> Result<TrackMetadata, MusicError>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as a URL.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }

    /// Splits the argument of `multi_queue` into individual queries.
    pub fn split_queries(input: &str) -> Vec<&str> {
        input
            .split(',')
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .collect()
    }
}
