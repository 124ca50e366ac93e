use super::*;
use poise::CreateReply;
use tracing::{info, warn};

/// Add a song to the queue and start playing if nothing is
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Music",
    aliases("play", "p", "stream")
)]
pub async fn enqueue(
    ctx: Context<'_>,
    #[description = "URL or search query"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received enqueue command with query: {}", query);
    let (queue, session) = ensure_voice(&ctx).await?;

    let reply = ctx.say("Processing request...").await?;

    match queue.enqueue(&query, Some(ctx.author().name.clone())).await {
        Ok((track, position)) => {
            reply
                .edit(
                    ctx,
                    CreateReply::default()
                        .content("")
                        .embed(embedded_messages::added_to_queue(&track, position)),
                )
                .await?;
        }
        Err(err) => {
            warn!("Failed to queue '{}': {}", query, err);
            reply
                .edit(ctx, embedded_messages::error(err.user_message()).content(""))
                .await?;
            return Ok(());
        }
    }

    queue.play_if_idle(session).await;
    queue.arm_idle_deadline().await;

    Ok(())
}
