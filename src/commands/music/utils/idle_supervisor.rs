use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::music_manager::{MusicManager, MusicResult};
use super::queue_manager::GuildQueue;

pub const AUTO_DISCONNECT_MESSAGE: &str = "Automatically disconnected from voice.";

/// Periodically disconnects voice sessions that have been idle past their deadline.
pub struct IdleSupervisor {
    manager: Arc<MusicManager>,
    interval: Duration,
}

impl IdleSupervisor {
    pub fn new(manager: Arc<MusicManager>, interval: Duration) -> Self {
        Self { manager, interval }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Sweep every `interval` forever.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Idle supervisor sweeping every {:?}", self.interval);

        loop {
            ticker.tick().await;
            let disconnected = self.sweep(Instant::now()).await;
            if disconnected > 0 {
                info!("Idle sweep disconnected {} voice session(s)", disconnected);
            }
        }
    }

    /// Check every guild once. Returns how many sessions were disconnected.
    pub async fn sweep(&self, now: Instant) -> usize {
        let queues = self.manager.queues();
        let results = join_all(queues.iter().map(|queue| Self::sweep_guild(queue, now))).await;

        results
            .into_iter()
            .zip(&queues)
            .filter(|(result, queue)| match result {
                Ok(disconnected) => *disconnected,
                Err(e) => {
                    error!("Idle sweep failed for guild {}: {}", queue.guild_id(), e);
                    false
                }
            })
            .count()
    }

    async fn sweep_guild(queue: &GuildQueue, now: Instant) -> MusicResult<bool> {
        if !queue.take_expired_deadline(now).await {
            return Ok(false);
        }

        let Some(session) = queue.unbind_if_idle().await else {
            debug!("Guild {} has no idle voice session, dropping deadline", queue.guild_id());
            return Ok(false);
        };

        if let Some(notifier) = queue.notifier().await {
            if let Err(e) = notifier.notice(AUTO_DISCONNECT_MESSAGE).await {
                warn!(
                    "Failed to send idle notice in guild {}: {}",
                    queue.guild_id(),
                    e
                );
            }
        }

        session.disconnect(true).await?;
        info!("Disconnected idle voice session in guild {}", queue.guild_id());

        Ok(true)
    }
}
