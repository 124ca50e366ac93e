use super::*;

/// Join a voice channel, or move to it if already connected
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn join(
    ctx: Context<'_>,
    #[description = "Voice channel to join"]
    #[channel_types("Voice")]
    channel: serenity::all::GuildChannel,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let queue = ctx
        .data()
        .music
        .get_or_create(guild_id, Some(channel.id), notifier(&ctx))
        .await?;

    match live_session(&queue).await {
        Some(session) => session.move_to(channel.id).await?,
        None => {
            connect(&ctx, &queue, channel.id).await?;
        }
    }
    queue.arm_idle_deadline().await;

    ctx.send(embedded_messages::success(
        "🔊 Joined",
        format!("Connected to <#{}>", channel.id),
    ))
    .await?;

    Ok(())
}
