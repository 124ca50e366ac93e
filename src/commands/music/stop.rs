use super::*;

/// Stop the music, keeping the queue as it is
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn stop_queue(ctx: Context<'_>) -> CommandResult {
    if let Some(queue) = existing_queue(&ctx)? {
        queue.stop().await;
        queue.arm_idle_deadline().await;
    }

    ctx.send(embedded_messages::success(
        "⏹️ Stopped",
        "Playback stopped. Use `play_queue` to resume from the current track.",
    ))
    .await?;

    Ok(())
}
