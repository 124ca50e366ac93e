use super::*;
use poise::CreateReply;
use utils::queue_manager::QueueSnapshot;

/// Show the songs in the queue
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Music",
    aliases("queue")
)]
pub async fn show_queue(ctx: Context<'_>) -> CommandResult {
    let (snapshot, volume) = match existing_queue(&ctx)? {
        Some(queue) => (queue.snapshot().await, queue.volume().await),
        None => (
            QueueSnapshot {
                entries: Vec::new(),
                cursor: 0,
            },
            ctx.data().music.settings().default_volume,
        ),
    };

    ctx.send(CreateReply::default().embed(embedded_messages::music_queue(&snapshot, volume)))
        .await?;

    Ok(())
}
