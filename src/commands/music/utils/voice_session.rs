use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::{HttpRequest, Input};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, Songbird, TrackEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::commands::music::audio_sources::TrackMetadata;

use super::event_handlers::{PlaybackEnd, TrackEndNotifier};
use super::music_manager::{MusicError, MusicResult};

/// A live voice connection the playback driver can push tracks into.
#[async_trait]
pub trait VoiceSession: Send + Sync {
    /// Start `track`, replacing whatever was playing.
    async fn play(&self, track: &TrackMetadata, volume: f32) -> MusicResult<PlaybackEnd>;

    /// Stop the current track. The track's `PlaybackEnd` resolves.
    async fn stop(&self);

    async fn is_playing(&self) -> bool;

    async fn is_connected(&self) -> bool;

    /// Change the volume of the current track. `1.0` is unity gain.
    async fn set_volume(&self, volume: f32);

    async fn move_to(&self, channel_id: ChannelId) -> MusicResult<()>;

    /// Leave the voice channel. `force` also drops the call handler.
    async fn disconnect(&self, force: bool) -> MusicResult<()>;
}

/// `VoiceSession` backed by a songbird call.
pub struct SongbirdSession {
    manager: Arc<Songbird>,
    guild_id: GuildId,
    call: Arc<Mutex<Call>>,
    current: Mutex<Option<TrackHandle>>,
    http_client: reqwest::Client,
}

impl SongbirdSession {
    /// Join `channel_id`, deafened, and wrap the resulting call.
    pub async fn connect(
        manager: Arc<Songbird>,
        http_client: reqwest::Client,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Self> {
        let call = manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        if let Err(e) = call.lock().await.deafen(true).await {
            warn!("Failed to deafen in guild {}: {}", guild_id, e);
        }
        info!("Joined voice channel {} in guild {}", channel_id, guild_id);

        Ok(Self {
            manager,
            guild_id,
            call,
            current: Mutex::new(None),
            http_client,
        })
    }

    async fn current_track(&self) -> Option<TrackHandle> {
        self.current.lock().await.clone()
    }
}

#[async_trait]
impl VoiceSession for SongbirdSession {
    async fn play(&self, track: &TrackMetadata, volume: f32) -> MusicResult<PlaybackEnd> {
        let input: Input = HttpRequest::new(self.http_client.clone(), track.source_url.clone()).into();
        let handle = self.call.lock().await.play_only_input(input);

        if let Err(e) = handle.set_volume(volume) {
            warn!("Failed to set volume in guild {}: {}", self.guild_id, e);
        }

        let (notifier, ended) = TrackEndNotifier::new(self.guild_id);
        for event in [TrackEvent::End, TrackEvent::Error] {
            handle
                .add_event(Event::Track(event), notifier.clone())
                .map_err(|e| MusicError::PlaybackError(e.to_string()))?;
        }

        debug!("Started '{}' in guild {}", track.title, self.guild_id);
        *self.current.lock().await = Some(handle);

        Ok(ended)
    }

    async fn stop(&self) {
        if let Some(handle) = self.current.lock().await.take() {
            if let Err(e) = handle.stop() {
                debug!("Track in guild {} already stopped: {}", self.guild_id, e);
            }
        }
    }

    async fn is_playing(&self) -> bool {
        match self.current_track().await {
            Some(handle) => handle
                .get_info()
                .await
                .is_ok_and(|state| matches!(state.playing, PlayMode::Play)),
            None => false,
        }
    }

    async fn is_connected(&self) -> bool {
        self.call.lock().await.current_connection().is_some()
    }

    async fn set_volume(&self, volume: f32) {
        if let Some(handle) = self.current_track().await {
            if let Err(e) = handle.set_volume(volume) {
                warn!("Failed to set volume in guild {}: {}", self.guild_id, e);
            }
        }
    }

    async fn move_to(&self, channel_id: ChannelId) -> MusicResult<()> {
        self.manager
            .join(self.guild_id, channel_id)
            .await
            .map(|_| ())
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }

    async fn disconnect(&self, force: bool) -> MusicResult<()> {
        self.stop().await;

        let result = if force {
            self.manager.remove(self.guild_id).await
        } else {
            self.manager.leave(self.guild_id).await
        };
        info!("Left voice in guild {}", self.guild_id);

        result.map_err(|e| MusicError::JoinError(e.to_string()))
    }
}
