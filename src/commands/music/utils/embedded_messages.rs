use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter};

use super::queue_manager::QueueSnapshot;
use super::{format_count, format_duration};
use crate::commands::music::audio_sources::TrackMetadata;

const GREEN: u32 = 0x00ff00;
const RED: u32 = 0xff0000;

/// Listing is cut off after this many entries to stay within embed limits.
const MAX_LISTED: usize = 20;

fn track_fields(embed: CreateEmbed, metadata: &TrackMetadata) -> CreateEmbed {
    let embed = embed
        .field(
            "Title",
            format!("{} [🔗 Link]({})", metadata.title, metadata.link()),
            false,
        )
        .field(
            "Uploader",
            metadata.uploader.as_deref().unwrap_or("Unknown"),
            true,
        )
        .field("Duration", format_duration(metadata.duration), true)
        .field("Views", format_count(metadata.view_count), true)
        .field("Likes", format_count(metadata.like_count), true);

    match &metadata.thumbnail_url {
        Some(thumbnail) => embed.thumbnail(thumbnail),
        None => embed,
    }
}

/// Create an embed for when a song is now playing
pub fn now_playing(metadata: &TrackMetadata) -> CreateEmbed {
    track_fields(CreateEmbed::new().title("🎵 Now playing").color(GREEN), metadata)
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(metadata: &TrackMetadata, position: usize) -> CreateEmbed {
    let embed = CreateEmbed::new().title("🎵 Added to Queue").color(GREEN);
    track_fields(embed, metadata).field("Position", format!("`#{}`", position + 1), true)
}

/// Create an embed for the music queue
pub fn music_queue(snapshot: &QueueSnapshot, volume: u8) -> CreateEmbed {
    let mut description = String::new();

    if snapshot.entries.is_empty() {
        description.push_str("**📭 Queue is empty**");
    } else {
        description.push_str(&format!(
            "**📋 Queue - {} tracks**\n",
            snapshot.entries.len()
        ));
        for (index, track) in snapshot.entries.iter().enumerate().take(MAX_LISTED) {
            let marker = if index == snapshot.cursor { "▶️" } else { "•" };
            description.push_str(&format!(
                "{} `{}.` [{}]({}) `{}`\n",
                marker,
                index + 1,
                track.title,
                track.link(),
                format_duration(track.duration)
            ));
        }
        if snapshot.entries.len() > MAX_LISTED {
            description.push_str(&format!(
                "… and {} more\n",
                snapshot.entries.len() - MAX_LISTED
            ));
        }
        if snapshot.is_finished() {
            description.push_str("\n**⏹️ Reached the end of the queue**");
        }
    }

    CreateEmbed::new()
        .title("🎵 Music Queue")
        .description(description)
        .footer(CreateEmbedFooter::new(format!("Volume: {}%", volume)))
        .color(GREEN)
}

/// A short confirmation as a green embed.
pub fn success(title: &str, description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(title)
            .description(description)
            .color(GREEN),
    )
}

/// An error as a red embed.
pub fn error(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(description)
            .color(RED),
    )
}
