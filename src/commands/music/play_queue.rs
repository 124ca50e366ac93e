use super::*;
use tracing::info;

/// Start playing the queue from the current position
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn play_queue(ctx: Context<'_>) -> CommandResult {
    let (queue, session) = ensure_voice(&ctx).await?;

    let snapshot = queue.snapshot().await;
    if snapshot.entries.is_empty() {
        return Err(MusicError::EmptyQueue.into());
    }
    if snapshot.is_finished() {
        ctx.send(embedded_messages::success(
            "⏹️ End of Queue",
            "Every track has been played. Use `replay_queue` to start over.",
        ))
        .await?;
        return Ok(());
    }

    let description = if queue.play_if_idle(session).await {
        info!(
            "Starting queue at position {} in guild {}",
            snapshot.cursor,
            queue.guild_id()
        );
        format!("Starting from track `#{}`", snapshot.cursor + 1)
    } else {
        "The queue is already playing".to_string()
    };
    queue.arm_idle_deadline().await;

    ctx.send(embedded_messages::success("▶️ Playing Queue", description))
        .await?;

    Ok(())
}

/// Play the queue again from the first track
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn replay_queue(ctx: Context<'_>) -> CommandResult {
    let (queue, _) = ensure_voice(&ctx).await?;

    queue.replay().await?;
    queue.arm_idle_deadline().await;

    ctx.send(embedded_messages::success(
        "🔁 Replaying Queue",
        "Starting again from the first track",
    ))
    .await?;

    Ok(())
}
