//! Per-guild queue state and the playback driver that walks it.
//!
//! Every guild owns one `GuildQueue`. Its entries, cursor, voice session and
//! generation counter sit behind a single async mutex, so the driver and the
//! command handlers never observe a half-applied update. Each driver loop
//! captures a generation when it starts; any operation that restarts or stops
//! playback bumps the counter, and a loop whose generation is no longer current
//! exits without touching the cursor.

use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::commands::music::audio_sources::{MediaResolver, TrackMetadata};

use super::event_handlers::PlaybackEnd;
use super::music_manager::{MusicError, MusicResult};
use super::notifier::Notifier;
use super::voice_session::VoiceSession;

/// Timing and defaults shared by every guild queue.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// How often the driver re-checks that the session is still playing.
    pub poll_interval: Duration,
    /// How long a session may sit idle before the supervisor disconnects it.
    pub idle_timeout: Duration,
    /// Volume in percent for new queues.
    pub default_volume: u8,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            idle_timeout: Duration::from_secs(15 * 60),
            default_volume: 50,
        }
    }
}

/// Converts a volume percentage into the gain songbird expects.
pub fn volume_to_gain(percent: u8) -> f32 {
    f32::from(percent) / 100.0
}

/// A consistent view of a queue at one instant.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub entries: Vec<Arc<TrackMetadata>>,
    pub cursor: usize,
}

impl QueueSnapshot {
    /// The track at the cursor, if the queue has not been played through.
    pub fn current(&self) -> Option<&Arc<TrackMetadata>> {
        self.entries.get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.entries.len()
    }
}

struct QueueState {
    entries: Vec<Arc<TrackMetadata>>,
    // Invariant: cursor <= entries.len()
    cursor: usize,
    session: Option<Arc<dyn VoiceSession>>,
    voice_channel: ChannelId,
    notifier: Option<Arc<dyn Notifier>>,
    idle_deadline: Option<Instant>,
    generation: u64,
    // Generation of the loop currently driving the session.
    driver: Option<u64>,
    volume: u8,
}

/// The queue and playback cursor of a single guild.
pub struct GuildQueue {
    guild_id: GuildId,
    state: Mutex<QueueState>,
    // Serializes resolve + append. tokio's mutex wakes waiters in FIFO order.
    enqueue_lock: Mutex<()>,
    generations: watch::Sender<u64>,
    resolver: Arc<dyn MediaResolver>,
    settings: QueueSettings,
}

impl std::fmt::Debug for GuildQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuildQueue")
            .field("guild_id", &self.guild_id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl GuildQueue {
    pub fn new(
        guild_id: GuildId,
        voice_channel: ChannelId,
        resolver: Arc<dyn MediaResolver>,
        settings: QueueSettings,
    ) -> Self {
        let (generations, _) = watch::channel(0);
        Self {
            guild_id,
            state: Mutex::new(QueueState {
                entries: Vec::new(),
                cursor: 0,
                session: None,
                voice_channel,
                notifier: None,
                idle_deadline: None,
                generation: 0,
                driver: None,
                volume: settings.default_volume.min(100),
            }),
            enqueue_lock: Mutex::new(()),
            generations,
            resolver,
            settings,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Invalidates whichever driver loop is running. Must be called with the
    /// state lock held.
    fn bump_generation(&self, state: &mut QueueState) -> u64 {
        state.generation += 1;
        state.driver = None;
        self.generations.send_replace(state.generation);
        state.generation
    }

    pub async fn voice_channel(&self) -> ChannelId {
        self.state.lock().await.voice_channel
    }

    pub async fn set_voice_channel(&self, channel_id: ChannelId) {
        self.state.lock().await.voice_channel = channel_id;
    }

    pub async fn notifier(&self) -> Option<Arc<dyn Notifier>> {
        self.state.lock().await.notifier.clone()
    }

    pub async fn set_notifier(&self, notifier: Arc<dyn Notifier>) {
        self.state.lock().await.notifier = Some(notifier);
    }

    pub async fn session(&self) -> Option<Arc<dyn VoiceSession>> {
        self.state.lock().await.session.clone()
    }

    pub async fn bind_session(&self, session: Arc<dyn VoiceSession>) {
        self.state.lock().await.session = Some(session);
    }

    /// Detach the voice session, stopping any driver that was using it.
    pub async fn unbind_session(&self) -> Option<Arc<dyn VoiceSession>> {
        let mut state = self.state.lock().await;
        self.bump_generation(&mut state);
        state.session.take()
    }

    /// Detach the voice session only if no driver owns it and it is connected
    /// but silent. Checked and detached under one lock, so a driver cannot
    /// start a track in between.
    pub async fn unbind_if_idle(&self) -> Option<Arc<dyn VoiceSession>> {
        let mut state = self.state.lock().await;
        if state.driver.is_some() {
            return None;
        }

        let session = state.session.clone()?;
        if !session.is_connected().await || session.is_playing().await {
            return None;
        }

        self.bump_generation(&mut state);
        state.session.take()
    }

    /// Resolve `query` and append it. Returns the track and its position.
    ///
    /// Concurrent calls are applied in the order they acquired the enqueue
    /// lock. A failed resolution leaves the queue untouched.
    pub async fn enqueue(
        &self,
        query: &str,
        requested_by: Option<String>,
    ) -> MusicResult<(Arc<TrackMetadata>, usize)> {
        let _guard = self.enqueue_lock.lock().await;

        let track = Arc::new(self.resolver.resolve(query, requested_by).await?);

        let mut state = self.state.lock().await;
        state.entries.push(track.clone());
        let position = state.entries.len() - 1;
        info!(
            "Queued '{}' at position {} in guild {}",
            track.title, position, self.guild_id
        );

        Ok((track, position))
    }

    pub async fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.lock().await;
        QueueSnapshot {
            entries: state.entries.clone(),
            cursor: state.cursor,
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    pub async fn cursor(&self) -> usize {
        self.state.lock().await.cursor
    }

    /// Whether a driver loop currently owns the session.
    pub async fn is_driving(&self) -> bool {
        self.state.lock().await.driver.is_some()
    }

    /// Advance to the next entry and restart playback there.
    pub async fn skip(self: &Arc<Self>) -> MusicResult<usize> {
        self.reposition(|cursor| cursor + 1).await
    }

    /// Restart playback from the first entry.
    pub async fn replay(self: &Arc<Self>) -> MusicResult<usize> {
        self.reposition(|_| 0).await
    }

    /// Stop playback, move the cursor to `index` and restart the driver there.
    ///
    /// The index is clamped to the queue length. Without a voice session only
    /// the cursor moves.
    pub async fn set_cursor(self: &Arc<Self>, index: usize) -> MusicResult<usize> {
        self.reposition(|_| index).await
    }

    async fn reposition(
        self: &Arc<Self>,
        target: impl FnOnce(usize) -> usize,
    ) -> MusicResult<usize> {
        let (cursor, session) = {
            let mut state = self.state.lock().await;
            if state.entries.is_empty() {
                return Err(MusicError::EmptyQueue);
            }

            self.bump_generation(&mut state);
            if let Some(session) = &state.session {
                session.stop().await;
            }
            state.cursor = target(state.cursor).min(state.entries.len());
            (state.cursor, state.session.clone())
        };
        debug!("Cursor moved to {} in guild {}", cursor, self.guild_id);

        if let Some(session) = session {
            self.spawn_play(session);
        }

        Ok(cursor)
    }

    /// Stop playback and drop every entry.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        self.bump_generation(&mut state);
        if let Some(session) = &state.session {
            session.stop().await;
        }
        state.entries.clear();
        state.cursor = 0;
        info!("Cleared queue for guild {}", self.guild_id);
    }

    /// Stop playback, keeping entries and cursor.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        self.bump_generation(&mut state);
        if let Some(session) = &state.session {
            session.stop().await;
        }
        info!("Stopped playback in guild {}", self.guild_id);
    }

    pub async fn volume(&self) -> u8 {
        self.state.lock().await.volume
    }

    pub async fn set_volume(&self, percent: u8) -> MusicResult<()> {
        if percent > 100 {
            return Err(MusicError::InvalidVolume(percent));
        }

        let mut state = self.state.lock().await;
        state.volume = percent;
        if let Some(session) = &state.session {
            session.set_volume(volume_to_gain(percent)).await;
        }

        Ok(())
    }

    pub async fn idle_deadline(&self) -> Option<Instant> {
        self.state.lock().await.idle_deadline
    }

    /// Schedule an idle disconnect `idle_timeout` from now.
    pub async fn arm_idle_deadline(&self) {
        self.arm_idle_deadline_at(Instant::now() + self.settings.idle_timeout)
            .await;
    }

    pub async fn arm_idle_deadline_at(&self, deadline: Instant) {
        self.state.lock().await.idle_deadline = Some(deadline);
    }

    /// Clears the idle deadline and returns true if it had passed by `now`.
    pub async fn take_expired_deadline(&self, now: Instant) -> bool {
        let mut state = self.state.lock().await;
        match state.idle_deadline {
            Some(deadline) if deadline <= now => {
                state.idle_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Run `play` on its own task.
    pub fn spawn_play(self: &Arc<Self>, session: Arc<dyn VoiceSession>) -> JoinHandle<()> {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = queue.play(session).await {
                error!("Playback driver failed in guild {}: {}", queue.guild_id, e);
            }
        })
    }

    /// Start a driver on `session` unless one is already running.
    ///
    /// Returns whether a new driver was started. The check and the claim
    /// happen under one lock, so concurrent callers start at most one loop.
    pub async fn play_if_idle(self: &Arc<Self>, session: Arc<dyn VoiceSession>) -> bool {
        let generation = {
            let mut state = self.state.lock().await;
            if state.driver.is_some() {
                return false;
            }
            state.session = Some(session.clone());
            self.claim_driver(&mut state)
        };

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = queue.run_driver(session, generation).await {
                error!("Playback driver failed in guild {}: {}", queue.guild_id, e);
            }
        });

        true
    }

    /// Play the queue from the cursor on `session` until it runs out or the
    /// session disconnects.
    ///
    /// Takes over from any driver already running for this guild.
    pub async fn play(self: &Arc<Self>, session: Arc<dyn VoiceSession>) -> MusicResult<()> {
        self.bind_session(session.clone()).await;

        // An enqueue that is resolving right now lands before we start scanning.
        drop(self.enqueue_lock.lock().await);

        let generation = {
            let mut state = self.state.lock().await;
            let preempted = state.driver.is_some();
            let generation = self.claim_driver(&mut state);
            if preempted {
                session.stop().await;
            }
            generation
        };

        self.run_driver(session, generation).await
    }

    fn claim_driver(&self, state: &mut QueueState) -> u64 {
        let generation = self.bump_generation(state);
        state.driver = Some(generation);
        generation
    }

    async fn run_driver(
        self: &Arc<Self>,
        session: Arc<dyn VoiceSession>,
        generation: u64,
    ) -> MusicResult<()> {
        // A bump between the claim and this subscription is caught by the
        // generation checks in `drive`.
        let mut generations = self.generations.subscribe();
        info!(
            "Playback driver {} started in guild {}",
            generation, self.guild_id
        );

        let result = self.drive(&session, generation, &mut generations).await;

        let mut state = self.state.lock().await;
        if state.driver == Some(generation) {
            state.driver = None;
            state.idle_deadline = Some(Instant::now() + self.settings.idle_timeout);
            info!(
                "Playback driver {} finished in guild {}",
                generation, self.guild_id
            );
        }

        result
    }

    async fn drive(
        &self,
        session: &Arc<dyn VoiceSession>,
        generation: u64,
        generations: &mut watch::Receiver<u64>,
    ) -> MusicResult<()> {
        loop {
            if !session.is_connected().await {
                info!("Voice session in guild {} is disconnected", self.guild_id);
                return Ok(());
            }

            let track = {
                let state = self.state.lock().await;
                if state.generation != generation {
                    return Ok(());
                }
                match state.entries.get(state.cursor) {
                    Some(track) => track.clone(),
                    None => {
                        debug!("Reached the end of the queue in guild {}", self.guild_id);
                        return Ok(());
                    }
                }
            };

            let notifier = self.notifier().await;
            if let Some(notifier) = &notifier {
                if let Err(e) = notifier.now_playing(&track).await {
                    warn!("Failed to announce track in guild {}: {}", self.guild_id, e);
                }
            }

            let started = {
                let state = self.state.lock().await;
                if state.generation != generation {
                    return Ok(());
                }
                session.play(&track, volume_to_gain(state.volume)).await
            };

            match started {
                Ok(ended) => {
                    self.wait_for_track_end(session.as_ref(), ended, generation, generations)
                        .await
                }
                Err(e) => {
                    error!(
                        "Failed to play '{}' in guild {}: {}",
                        track.title, self.guild_id, e
                    );
                    if let Some(notifier) = &notifier {
                        let _ = notifier
                            .notice(&format!("Could not play {}, skipping.", track.title))
                            .await;
                    }
                }
            }

            let mut state = self.state.lock().await;
            if state.generation != generation {
                debug!(
                    "Driver {} in guild {} is stale, not advancing",
                    generation, self.guild_id
                );
                return Ok(());
            }
            state.cursor = (state.cursor + 1).min(state.entries.len());
        }
    }

    /// Returns once the track ends, playback is restarted elsewhere, or a poll
    /// finds the session idle or gone.
    async fn wait_for_track_end(
        &self,
        session: &dyn VoiceSession,
        mut ended: PlaybackEnd,
        generation: u64,
        generations: &mut watch::Receiver<u64>,
    ) {
        let mut poll = tokio::time::interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        poll.tick().await;

        loop {
            tokio::select! {
                _ = &mut ended => return,
                changed = generations.changed() => {
                    if changed.is_err() || *generations.borrow_and_update() != generation {
                        return;
                    }
                }
                _ = poll.tick() => {
                    if !session.is_playing().await || !session.is_connected().await {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0.0)]
    #[case(50, 0.5)]
    #[case(100, 1.0)]
    fn gain_from_percent(#[case] percent: u8, #[case] gain: f32) {
        assert!((volume_to_gain(percent) - gain).abs() < f32::EPSILON);
    }

    #[test]
    fn snapshot_past_the_end_is_finished() {
        let track = Arc::new(TrackMetadata {
            title: "a".into(),
            source_url: "https://a".into(),
            webpage_url: None,
            uploader: None,
            duration: None,
            view_count: None,
            like_count: None,
            thumbnail_url: None,
            requested_by: None,
        });
        let snapshot = QueueSnapshot {
            entries: vec![track],
            cursor: 1,
        };

        assert!(snapshot.is_finished());
        assert!(snapshot.current().is_none());
    }
}
