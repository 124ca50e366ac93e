use super::*;
use audio_sources::AudioSource;
use poise::CreateReply;
use serenity::all::CreateEmbed;
use tracing::{info, warn};

/// Add several comma-separated songs to the queue, in order
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn multi_queue(
    ctx: Context<'_>,
    #[description = "Comma-separated URLs or search queries"]
    #[rest]
    queries: String,
) -> CommandResult {
    let queries = AudioSource::split_queries(&queries);
    if queries.is_empty() {
        ctx.send(embedded_messages::error("Nothing to queue.")).await?;
        return Ok(());
    }
    info!("Received multi_queue command with {} queries", queries.len());

    let (queue, session) = ensure_voice(&ctx).await?;
    let reply = ctx.say("Processing request...").await?;

    let mut lines = Vec::with_capacity(queries.len());
    for query in queries {
        match queue.enqueue(query, Some(ctx.author().name.clone())).await {
            Ok((track, position)) => {
                lines.push(format!("✅ `#{}` {}", position + 1, track.title));
                queue.play_if_idle(session.clone()).await;
            }
            Err(err) => {
                warn!("Failed to queue '{}': {}", query, err);
                lines.push(format!("❌ {}: {}", query, err.user_message()));
            }
        }
    }
    queue.arm_idle_deadline().await;

    let embed = CreateEmbed::new()
        .title("🎵 Added to Queue")
        .description(lines.join("\n"))
        .color(0x00ff00);
    reply
        .edit(ctx, CreateReply::default().content("").embed(embed))
        .await?;

    Ok(())
}
