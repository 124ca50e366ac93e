use serenity::all::{ActivityData, Guild, OnlineStatus, Ready, UnavailableGuild};
use serenity::async_trait;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::info;

use crate::commands::music::utils::music_manager::MusicManager;

pub struct Handler {
    music: Arc<MusicManager>,
    prefix: String,
    development: bool,
}

impl Handler {
    pub fn new(music: Arc<MusicManager>, prefix: String, development: bool) -> Self {
        Self {
            music,
            prefix,
            development,
        }
    }

    fn presence(&self) -> (ActivityData, OnlineStatus) {
        if self.development {
            (
                ActivityData::playing("Under maintenance"),
                OnlineStatus::DoNotDisturb,
            )
        } else {
            (
                ActivityData::listening(format!("Prefix[{}]", self.prefix)),
                OnlineStatus::Online,
            )
        }
    }
}

#[async_trait]
impl serenity::prelude::EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Connection established. Connected as [{}] to {} guild(s)",
            ready.user.name,
            ready.guilds.len()
        );

        let (activity, status) = self.presence();
        ctx.set_presence(Some(activity), status);
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        // `unavailable` means an outage, not that the bot was removed.
        if !incomplete.unavailable {
            self.music.evict(incomplete.id).await;
        }
    }
}
