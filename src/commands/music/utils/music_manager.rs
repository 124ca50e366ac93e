use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::commands::music::audio_sources::MediaResolver;

use super::notifier::Notifier;
use super::queue_manager::{GuildQueue, QueueSettings};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("You are not connected to a voice channel.")]
    NotInVoiceChannel,

    #[error("Not connected to a voice channel.")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Failed to resolve media: {0}")]
    ResolutionFailed(String),

    #[error("The queue is empty.")]
    EmptyQueue,

    #[error("Command On Cooldown.")]
    RateLimited(Duration),

    #[error("Volume must be between 0 and 100, got {0}")]
    InvalidVolume(u8),

    #[error("Playback error: {0}")]
    PlaybackError(String),
}

impl MusicError {
    /// The text shown to the user when this error reaches the command boundary.
    pub fn user_message(&self) -> String {
        match self {
            // Resolution details come from yt-dlp stderr and stay in the logs.
            MusicError::ResolutionFailed(_) => "Something went wrong.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Owns the queue of every guild the bot is playing in.
///
/// Constructed once at startup and shared by the command handlers, the
/// gateway event handler and the idle supervisor.
pub struct MusicManager {
    queues: DashMap<GuildId, Arc<GuildQueue>>,
    resolver: Arc<dyn MediaResolver>,
    settings: QueueSettings,
}

impl MusicManager {
    pub fn new(resolver: Arc<dyn MediaResolver>, settings: QueueSettings) -> Self {
        Self {
            queues: DashMap::new(),
            resolver,
            settings,
        }
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Returns the guild's queue, creating one bound to `voice_channel` on first use.
    ///
    /// The notifier is always replaced so announcements follow the channel the
    /// latest command was issued in.
    pub async fn get_or_create(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        notifier: Arc<dyn Notifier>,
    ) -> MusicResult<Arc<GuildQueue>> {
        let queue = match self.get(guild_id) {
            Some(queue) => queue,
            None => {
                let channel_id = voice_channel.ok_or(MusicError::NotInVoiceChannel)?;
                self.queues
                    .entry(guild_id)
                    .or_insert_with(|| {
                        info!("Creating queue for guild {}", guild_id);
                        Arc::new(GuildQueue::new(
                            guild_id,
                            channel_id,
                            self.resolver.clone(),
                            self.settings.clone(),
                        ))
                    })
                    .clone()
            }
        };

        if let Some(channel_id) = voice_channel {
            queue.set_voice_channel(channel_id).await;
        }
        queue.set_notifier(notifier).await;

        Ok(queue)
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<GuildQueue>> {
        self.queues.get(&guild_id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every registered queue.
    pub fn queues(&self) -> Vec<Arc<GuildQueue>> {
        self.queues
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Drop the guild's queue, stopping anything it was playing.
    pub async fn evict(&self, guild_id: GuildId) -> bool {
        match self.queues.remove(&guild_id) {
            Some((_, queue)) => {
                queue.reset().await;
                info!("Evicted queue for guild {}", guild_id);
                true
            }
            None => {
                debug!("No queue to evict for guild {}", guild_id);
                false
            }
        }
    }
}
