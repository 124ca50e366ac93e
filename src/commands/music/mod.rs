pub(crate) mod clear_queue;
pub(crate) mod enqueue;
pub(crate) mod join;
pub(crate) mod leave;
pub(crate) mod multi_queue;
pub(crate) mod play_queue;
pub(crate) mod show_queue;
pub(crate) mod skip;
pub(crate) mod stop;
pub(crate) mod volume;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use serenity::all::{ChannelId, GuildId};
use std::sync::Arc;
use tracing::debug;

use utils::{
    embedded_messages,
    music_manager::{MusicError, MusicResult},
    notifier::{ChannelNotifier, Notifier},
    queue_manager::GuildQueue,
    voice_session::{SongbirdSession, VoiceSession},
};

fn guild_id(ctx: &Context<'_>) -> MusicResult<GuildId> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

/// The voice channel the command author is sitting in, read from the cache.
fn user_voice_channel(ctx: &Context<'_>) -> Option<ChannelId> {
    let guild = ctx.guild()?;
    guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|state| state.channel_id)
}

fn notifier(ctx: &Context<'_>) -> Arc<dyn Notifier> {
    Arc::new(ChannelNotifier::new(
        ctx.serenity_context().http.clone(),
        ctx.channel_id(),
    ))
}

/// The invoking guild's queue. Creating one requires the author to be in voice.
async fn guild_queue(ctx: &Context<'_>) -> MusicResult<Arc<GuildQueue>> {
    let guild_id = guild_id(ctx)?;
    ctx.data()
        .music
        .get_or_create(guild_id, user_voice_channel(ctx), notifier(ctx))
        .await
}

async fn live_session(queue: &GuildQueue) -> Option<Arc<dyn VoiceSession>> {
    let session = queue.session().await?;
    session.is_connected().await.then_some(session)
}

/// Open a fresh voice session on `channel_id` and bind it to `queue`,
/// retiring any session that has dropped its connection.
async fn connect(
    ctx: &Context<'_>,
    queue: &Arc<GuildQueue>,
    channel_id: ChannelId,
) -> MusicResult<Arc<dyn VoiceSession>> {
    if queue.session().await.is_some() {
        debug!("Replacing dead voice session in guild {}", queue.guild_id());
        queue.unbind_session().await;
    }

    let manager = songbird::get(ctx.serenity_context())
        .await
        .ok_or(MusicError::NoVoiceManager)?;
    let session: Arc<dyn VoiceSession> = Arc::new(
        SongbirdSession::connect(
            manager,
            ctx.data().http_client.clone(),
            queue.guild_id(),
            channel_id,
        )
        .await?,
    );
    queue.bind_session(session.clone()).await;

    Ok(session)
}

/// The queue plus a connected voice session, joining the queue's voice
/// channel when the bot is not in voice yet.
async fn ensure_voice(ctx: &Context<'_>) -> MusicResult<(Arc<GuildQueue>, Arc<dyn VoiceSession>)> {
    let queue = guild_queue(ctx).await?;

    if let Some(session) = live_session(&queue).await {
        return Ok((queue, session));
    }

    let channel_id = queue.voice_channel().await;
    let session = connect(ctx, &queue, channel_id).await?;
    Ok((queue, session))
}

/// The invoking guild's queue, if one was ever created. Never joins voice.
fn existing_queue(ctx: &Context<'_>) -> MusicResult<Option<Arc<GuildQueue>>> {
    Ok(ctx.data().music.get(guild_id(ctx)?))
}
