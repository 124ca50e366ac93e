use serenity::all::{ChannelId, CreateMessage, Http};
use serenity::async_trait;
use std::sync::Arc;

use crate::Error;
use crate::commands::music::audio_sources::TrackMetadata;

use super::embedded_messages;

/// Where a guild's playback status messages go.
///
/// Set from the context of the most recent music command.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce that `track` has started playing.
    async fn now_playing(&self, track: &TrackMetadata) -> Result<(), Error>;

    /// Send a plain status line.
    async fn notice(&self, message: &str) -> Result<(), Error>;
}

/// Posts status messages into a text channel.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn now_playing(&self, track: &TrackMetadata) -> Result<(), Error> {
        let message = CreateMessage::new().embed(embedded_messages::now_playing(track));
        self.channel_id.send_message(self.http.clone(), message).await?;
        Ok(())
    }

    async fn notice(&self, message: &str) -> Result<(), Error> {
        self.channel_id.say(&self.http, message).await?;
        Ok(())
    }
}
