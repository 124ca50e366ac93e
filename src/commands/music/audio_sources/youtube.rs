//! Implements `MediaResolver` using the `yt-dlp` command-line tool.

use crate::commands::music::utils::music_manager::MusicError;
use serenity::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{AudioSource, MediaResolver, TrackMetadata};

/// Resolves tracks by running `yt-dlp -J` as a child process.
pub struct YtDlpResolver {
    program: String,
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Free text is searched on YouTube; URLs are passed through.
    fn target(query: &str) -> String {
        if AudioSource::is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch1:{}", query)
        }
    }

    fn args(query: &str) -> Vec<String> {
        [
            "-J", // Dump a single JSON document
            "--no-playlist",
            "--format",
            "bestaudio/best",
            "--default-search",
            "auto",
            "--no-check-certificates",
            "--force-ipv4",
            "--quiet",
            "--no-warnings",
        ]
        .into_iter()
        .map(String::from)
        .chain(std::iter::once(Self::target(query)))
        .collect()
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve(
        &self,
        query: &str,
        requested_by: Option<String>,
    ) -> Result<TrackMetadata, MusicError> {
        info!("Resolving media for query: {}", query);

        let output = Command::new(&self.program)
            .args(Self::args(query))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MusicError::ResolutionFailed(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} exited with {}: {}", self.program, output.status, stderr.trim());
            return Err(MusicError::ResolutionFailed(stderr.trim().to_string()));
        }

        let metadata =
            TrackMetadata::from_ytdlp_json(&String::from_utf8_lossy(&output.stdout), requested_by)?;
        debug!("Resolved '{}' to '{}'", query, metadata.title);

        Ok(metadata)
    }
}
