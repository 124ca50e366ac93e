use super::*;

/// Ping the bot to check its latency
#[poise::command(
    prefix_command,
    slash_command,
    category = "General",
    channel_cooldown = 12
)]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let latency = get_shard_latency(&ctx)
        .await
        .unwrap_or_default()
        .as_millis();

    let embed = CreateEmbed::new()
        .title("Pong!")
        .field("API Latency", format!("{} ms", latency), false);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
