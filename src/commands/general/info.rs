use super::*;
use serenity::all::CreateEmbedFooter;

/// Show information about the bot
#[poise::command(
    prefix_command,
    slash_command,
    category = "General",
    rename = "botinfo",
    aliases("info"),
    guild_cooldown = 12
)]
pub async fn info(ctx: Context<'_>) -> CommandResult {
    let latency = get_shard_latency(&ctx)
        .await
        .unwrap_or_default()
        .as_millis();
    // Drop sub-second precision so the uptime reads "2h 3m 4s".
    let uptime = Duration::from_secs(ctx.data().started_at.elapsed().as_secs());

    let (name, avatar) = {
        let user = ctx.serenity_context().cache.current_user();
        (user.name.clone(), user.face())
    };
    let guilds = ctx.serenity_context().cache.guild_count();

    let embed = CreateEmbed::new()
        .title("Bot Info")
        .thumbnail(avatar)
        .field("Client name", name, true)
        .field("Servers", guilds.to_string(), true)
        .field("Uptime", humantime::format_duration(uptime).to_string(), true)
        .field("API Latency", format!("{} ms", latency), true)
        .field("Prefix", format!("`{}`", ctx.data().prefix), true)
        .footer(CreateEmbedFooter::new(format!(
            "Requested by {}",
            ctx.author().name
        )))
        .color(0x00ff00);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
