use super::*;

/// Skip the currently playing song
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Music",
    aliases("skip")
)]
pub async fn skip_queue_entry(ctx: Context<'_>) -> CommandResult {
    let (queue, _) = ensure_voice(&ctx).await?;

    let cursor = queue.skip().await?;
    queue.arm_idle_deadline().await;

    let description = if cursor >= queue.len().await {
        "Reached the end of the queue".to_string()
    } else {
        format!("Skipped to track `#{}`", cursor + 1)
    };
    ctx.send(embedded_messages::success("⏭️ Skipped Track", description))
        .await?;

    Ok(())
}
