use super::*;

/// Change the playback volume
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Volume in percent"]
    #[min = 0]
    #[max = 100]
    percent: u8,
) -> CommandResult {
    let queue = existing_queue(&ctx)?.ok_or(MusicError::NotConnected)?;
    if queue.session().await.is_none() {
        return Err(MusicError::NotConnected.into());
    }

    queue.set_volume(percent).await?;

    ctx.send(embedded_messages::success(
        "🔊 Volume",
        format!("Volume set to {}%", percent),
    ))
    .await?;

    Ok(())
}
