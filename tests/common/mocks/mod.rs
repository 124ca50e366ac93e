//! Mock implementations for the voice, notification and resolver seams

use jukebox::Error;
use jukebox::commands::music::audio_sources::{MediaResolver, TrackMetadata};
use jukebox::commands::music::utils::event_handlers::PlaybackEnd;
use jukebox::commands::music::utils::music_manager::{MusicError, MusicResult};
use jukebox::commands::music::utils::notifier::Notifier;
use jukebox::commands::music::utils::voice_session::VoiceSession;
use mockall::mock;
use serenity::async_trait;
use serenity::model::id::ChannelId;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use super::fixtures;

mock! {
    pub Resolver {}

    #[async_trait]
    impl MediaResolver for Resolver {
        async fn resolve(
            &self,
            query: &str,
            requested_by: Option<String>,
        ) -> Result<TrackMetadata, MusicError>;
    }
}

/// Resolves every query to a track titled after it.
#[derive(Default)]
pub struct FakeResolver {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make resolving `query` take `delay`.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Make resolving `query` fail.
    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// Queries in the order resolution started.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaResolver for FakeResolver {
    async fn resolve(
        &self,
        query: &str,
        requested_by: Option<String>,
    ) -> Result<TrackMetadata, MusicError> {
        self.calls.lock().unwrap().push(query.to_string());

        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(query) {
            return Err(MusicError::ResolutionFailed(format!("no results for {}", query)));
        }

        Ok(TrackMetadata {
            requested_by,
            ..fixtures::track(query)
        })
    }
}

/// A voice connection that records what it was asked to do.
///
/// A played track keeps "playing" until `finish_current`, `stop` or the next
/// `play` ends it.
pub struct FakeSession {
    connected: AtomicBool,
    playing: AtomicBool,
    current: Mutex<Option<oneshot::Sender<()>>>,
    plays: Mutex<Vec<String>>,
    unplayable: Mutex<HashSet<String>>,
    volume: Mutex<Option<f32>>,
    stops: AtomicUsize,
    disconnects: AtomicUsize,
}

impl FakeSession {
    pub fn connected() -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(true),
            playing: AtomicBool::new(false),
            current: Mutex::new(None),
            plays: Mutex::new(Vec::new()),
            unplayable: Mutex::new(HashSet::new()),
            volume: Mutex::new(None),
            stops: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        })
    }

    /// Titles in the order they were started.
    pub fn plays(&self) -> Vec<String> {
        self.plays.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn volume(&self) -> Option<f32> {
        *self.volume.lock().unwrap()
    }

    pub fn playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Refuse to start `title`.
    pub fn refuse(&self, title: &str) {
        self.unplayable.lock().unwrap().insert(title.to_string());
    }

    /// End the current track as if it played to completion.
    pub fn finish_current(&self) {
        self.end_current();
    }

    fn end_current(&self) {
        self.playing.store(false, Ordering::SeqCst);
        if let Some(sender) = self.current.lock().unwrap().take() {
            let _ = sender.send(());
        }
    }
}

#[async_trait]
impl VoiceSession for FakeSession {
    async fn play(&self, track: &TrackMetadata, volume: f32) -> MusicResult<PlaybackEnd> {
        if self.unplayable.lock().unwrap().contains(&track.title) {
            return Err(MusicError::PlaybackError(format!(
                "cannot open {}",
                track.source_url
            )));
        }

        self.end_current();
        let (sender, ended) = oneshot::channel();
        *self.current.lock().unwrap() = Some(sender);
        *self.volume.lock().unwrap() = Some(volume);
        self.plays.lock().unwrap().push(track.title.clone());
        self.playing.store(true, Ordering::SeqCst);

        Ok(ended)
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.end_current();
    }

    async fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = Some(volume);
    }

    async fn move_to(&self, _channel_id: ChannelId) -> MusicResult<()> {
        Ok(())
    }

    async fn disconnect(&self, _force: bool) -> MusicResult<()> {
        self.end_current();
        self.connected.store(false, Ordering::SeqCst);
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Collects everything the queue tried to tell the channel.
#[derive(Default)]
pub struct RecordingNotifier {
    announced: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Titles announced as now playing, in order.
    pub fn announced(&self) -> Vec<String> {
        self.announced.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn now_playing(&self, track: &TrackMetadata) -> Result<(), Error> {
        self.announced.lock().unwrap().push(track.title.clone());
        Ok(())
    }

    async fn notice(&self, message: &str) -> Result<(), Error> {
        self.notices.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
