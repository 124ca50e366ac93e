use super::*;
use serenity::all::GetMessages;
use tracing::{debug, info};

const DEFAULT_AMOUNT: u8 = 5;

/// Delete recent messages in this channel
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "General",
    required_permissions = "MANAGE_MESSAGES",
    required_bot_permissions = "MANAGE_MESSAGES"
)]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "Number of messages to delete"]
    #[min = 1]
    #[max = 100]
    amount: Option<u8>,
) -> CommandResult {
    let amount = amount.unwrap_or(DEFAULT_AMOUNT).clamp(1, 100);
    let channel_id = ctx.channel_id();

    let messages = channel_id
        .messages(ctx.http(), GetMessages::new().limit(amount))
        .await?;

    let mut deleted = 0;
    for message in &messages {
        // Messages may already be gone or too old to delete; carry on.
        match channel_id.delete_message(ctx.http(), message.id).await {
            Ok(()) => deleted += 1,
            Err(e) => debug!("Could not delete message {}: {}", message.id, e),
        }
    }
    info!("Cleared {} message(s) in channel {}", deleted, channel_id);

    ctx.send(
        CreateReply::default()
            .content(format!("🧹 Deleted {} message(s)", deleted))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
