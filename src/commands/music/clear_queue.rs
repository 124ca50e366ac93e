use super::*;

/// Stop the music and remove every song from the queue
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn clear_queue(ctx: Context<'_>) -> CommandResult {
    if let Some(queue) = existing_queue(&ctx)? {
        queue.reset().await;
        queue.arm_idle_deadline().await;
    }

    ctx.send(embedded_messages::success(
        "🗑️ Queue Cleared",
        "Removed every track from the queue",
    ))
    .await?;

    Ok(())
}
