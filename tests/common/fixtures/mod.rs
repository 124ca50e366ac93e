//! Sample tracks, ids and settings used in tests

use fake::Fake;
use fake::faker::lorem::en::Words;
use jukebox::commands::music::audio_sources::TrackMetadata;
use jukebox::commands::music::utils::queue_manager::QueueSettings;
use serenity::model::id::{ChannelId, GuildId};
use std::time::Duration;

/// Short enough that driver tests finish quickly.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

pub fn guild_id() -> GuildId {
    GuildId::new(123456789)
}

pub fn voice_channel() -> ChannelId {
    ChannelId::new(987654321)
}

pub fn settings() -> QueueSettings {
    QueueSettings {
        poll_interval: POLL_INTERVAL,
        idle_timeout: IDLE_TIMEOUT,
        default_volume: 50,
    }
}

/// A resolved track whose title is `title`.
pub fn track(title: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.to_string(),
        source_url: format!("https://media.example.com/{}", title.replace(' ', "-")),
        webpage_url: Some(format!("https://www.youtube.com/watch?v={}", title.len())),
        uploader: Some("Test Uploader".to_string()),
        duration: Some(187),
        view_count: Some(12_345),
        like_count: Some(678),
        thumbnail_url: None,
        requested_by: None,
    }
}

/// A track with a generated title.
pub fn random_title() -> String {
    let words: Vec<String> = Words(2..5).fake();
    words.join(" ")
}
