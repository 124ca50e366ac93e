use super::*;

/// Stop the music and leave the voice channel
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Music",
    aliases("disconnect")
)]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let queue = existing_queue(&ctx)?.ok_or(MusicError::NotConnected)?;
    let session = queue
        .unbind_session()
        .await
        .ok_or(MusicError::NotConnected)?;

    session.disconnect(true).await?;

    ctx.send(embedded_messages::success(
        "👋 Disconnected",
        "Left the voice channel",
    ))
    .await?;

    Ok(())
}
