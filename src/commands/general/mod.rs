pub(crate) mod clear;
pub(crate) mod info;
pub(crate) mod ping;

use crate::{CommandResult, Context};
use poise::CreateReply;
use serenity::all::{CreateEmbed, ShardId};
use std::time::Duration;

/// Heartbeat latency of the shard this command arrived on, if measured yet.
async fn get_shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx.framework().shard_manager();
    let runners = shard_manager.runners.lock().await;

    // Each shard is driven by a runner that tracks its own heartbeat.
    let runner = runners.get(&ShardId(ctx.serenity_context().shard_id.0))?;

    runner.latency
}
