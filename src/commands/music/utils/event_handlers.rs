use serenity::async_trait;
use serenity::model::id::GuildId;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

/// Completion signal for one track, resolved when it ends, errors or is stopped.
pub type PlaybackEnd = oneshot::Receiver<()>;

/// Songbird event handler that resolves a `PlaybackEnd` once the track is over.
///
/// Registered for both `TrackEvent::End` and `TrackEvent::Error`; whichever
/// fires first completes the signal.
#[derive(Clone)]
pub struct TrackEndNotifier {
    guild_id: GuildId,
    sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl TrackEndNotifier {
    pub fn new(guild_id: GuildId) -> (Self, PlaybackEnd) {
        let (sender, receiver) = oneshot::channel();
        let notifier = Self {
            guild_id,
            sender: Arc::new(Mutex::new(Some(sender))),
        };
        (notifier, receiver)
    }

    fn complete(&self) {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            debug!("Track ended for guild {}", self.guild_id);
            // The driver may already have given up on this track.
            let _ = sender.send(());
        }
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(_) = ctx {
            self.complete();
        }
        None
    }
}
