mod common;

use assert_matches::assert_matches;
use common::fixtures::{self, guild_id, settings, voice_channel};
use common::mocks::{FakeResolver, FakeSession, MockResolver, RecordingNotifier};
use common::{settle, wait_until};
use futures::future::join_all;
use jukebox::commands::music::audio_sources::{MediaResolver, TrackMetadata};
use jukebox::commands::music::utils::music_manager::{MusicError, MusicManager};
use jukebox::commands::music::utils::queue_manager::GuildQueue;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;

fn queue_with(resolver: Arc<dyn MediaResolver>) -> Arc<GuildQueue> {
    Arc::new(GuildQueue::new(
        guild_id(),
        voice_channel(),
        resolver,
        settings(),
    ))
}

#[fixture]
fn notifier() -> Arc<RecordingNotifier> {
    RecordingNotifier::new()
}

/// A queue holding `titles`, announcing through `notifier`.
async fn filled_queue(titles: &[&str], notifier: &Arc<RecordingNotifier>) -> Arc<GuildQueue> {
    let queue = queue_with(Arc::new(FakeResolver::new()));
    queue.set_notifier(notifier.clone()).await;
    for title in titles {
        queue.enqueue(title, None).await.unwrap();
    }
    queue
}

fn titles(entries: &[Arc<TrackMetadata>]) -> Vec<String> {
    entries.iter().map(|track| track.title.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn concurrent_enqueues_keep_lock_order() {
    // The first query resolves slowest; it must still land first.
    let resolver = Arc::new(
        FakeResolver::new()
            .with_delay("first", Duration::from_millis(300))
            .with_delay("second", Duration::from_millis(100)),
    );
    let queue = queue_with(resolver.clone());

    let mut tasks = Vec::new();
    for query in ["first", "second", "third"] {
        let queue = queue.clone();
        tasks.push(tokio::spawn(async move { queue.enqueue(query, None).await }));
        // Let the task reach the lock before the next one is spawned.
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let positions: Vec<usize> = join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.unwrap().unwrap().1)
        .collect();

    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(resolver.calls(), vec!["first", "second", "third"]);
    assert_eq!(
        titles(&queue.snapshot().await.entries),
        vec!["first", "second", "third"]
    );
}

#[tokio::test(start_paused = true)]
async fn play_waits_for_enqueue_in_flight() {
    let queue = queue_with(Arc::new(
        FakeResolver::new().with_delay("slow", Duration::from_millis(100)),
    ));

    let pending = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.enqueue("slow", None).await })
    };
    // The enqueue is now resolving with its lock held.
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(queue.is_empty().await);

    let session = FakeSession::connected();
    queue.spawn_play(session.clone());
    pending.await.unwrap().unwrap();

    wait_until(|| session.plays() == ["slow"]).await;
    assert!(queue.is_driving().await);
    assert_eq!(queue.cursor().await, 0);
}

#[tokio::test]
async fn concurrent_enqueues_lose_nothing() {
    let resolver = Arc::new(FakeResolver::new().failing_on("broken"));
    let queue = queue_with(resolver);

    let mut queries: Vec<String> = (0..20)
        .map(|i| format!("{} {}", fixtures::random_title(), i))
        .collect();
    queries.push("broken".to_string());

    let results = join_all(queries.iter().map(|query| queue.enqueue(query, None))).await;

    let succeeded = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(succeeded, 20);
    assert_eq!(queue.len().await, 20);

    let mut queued = titles(&queue.snapshot().await.entries);
    queued.sort();
    queued.dedup();
    assert_eq!(queued.len(), 20);
}

#[tokio::test]
async fn failed_resolution_leaves_queue_unchanged() {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .times(2)
        .returning(|query, requested_by| match query {
            "unknown" => Err(MusicError::ResolutionFailed("HTTP Error 404".to_string())),
            _ => Ok(TrackMetadata {
                requested_by,
                ..fixtures::track(query)
            }),
        });
    let queue = queue_with(Arc::new(resolver));

    let (track, position) = queue
        .enqueue("known", Some("alice".to_string()))
        .await
        .unwrap();
    assert_eq!(track.requested_by.as_deref(), Some("alice"));
    assert_eq!(position, 0);

    let result = queue.enqueue("unknown", None).await;

    assert_matches!(result, Err(MusicError::ResolutionFailed(_)));
    assert_eq!(
        result.unwrap_err().user_message(),
        "Something went wrong."
    );
    assert_eq!(queue.len().await, 1);
}

#[rstest]
#[tokio::test]
async fn reset_is_idempotent(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b"], &notifier).await;

    for _ in 0..2 {
        queue.reset().await;

        let snapshot = queue.snapshot().await;
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.cursor, 0);
    }
}

#[rstest]
#[tokio::test]
async fn skip_announces_next_entry(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b", "c"], &notifier).await;
    let session = FakeSession::connected();

    queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;

    assert_eq!(queue.skip().await.unwrap(), 1);
    wait_until(|| session.plays() == ["a", "b"]).await;

    assert_eq!(queue.cursor().await, 1);
    assert_eq!(notifier.announced(), vec!["a", "b"]);
}

#[rstest]
#[tokio::test]
async fn replay_after_skip_returns_to_first_entry(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b", "c"], &notifier).await;
    let session = FakeSession::connected();

    queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;
    queue.skip().await.unwrap();
    wait_until(|| session.plays() == ["a", "b"]).await;

    assert_eq!(queue.replay().await.unwrap(), 0);
    wait_until(|| session.plays() == ["a", "b", "a"]).await;

    // No leftover driver moves the cursor while "a" is still playing.
    settle().await;
    assert_eq!(queue.cursor().await, 0);
    assert_eq!(session.plays(), vec!["a", "b", "a"]);

    session.finish_current();
    wait_until(|| session.plays() == ["a", "b", "a", "b"]).await;
    assert_eq!(queue.cursor().await, 1);
}

#[rstest]
#[tokio::test]
async fn plays_through_and_arms_idle_deadline(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b"], &notifier).await;
    let session = FakeSession::connected();

    let driver = queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;
    session.finish_current();
    wait_until(|| session.plays() == ["a", "b"]).await;
    session.finish_current();
    driver.await.unwrap();

    let snapshot = queue.snapshot().await;
    assert!(snapshot.is_finished());
    assert_eq!(snapshot.cursor, 2);
    assert!(!queue.is_driving().await);
    assert!(queue.idle_deadline().await.is_some());
}

#[rstest]
#[tokio::test]
async fn unplayable_track_is_skipped(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b", "c"], &notifier).await;
    let session = FakeSession::connected();
    session.refuse("b");

    queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;
    session.finish_current();
    wait_until(|| session.plays() == ["a", "c"]).await;

    assert_eq!(queue.cursor().await, 2);
    assert_eq!(notifier.notices(), vec!["Could not play b, skipping."]);
}

#[rstest]
#[tokio::test]
async fn driver_stops_when_session_disconnects(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b"], &notifier).await;
    let session = FakeSession::connected();

    let driver = queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;
    session.set_connected(false);
    session.set_playing(false);
    driver.await.unwrap();

    assert_eq!(session.plays(), vec!["a"]);
    assert!(!queue.is_driving().await);
}

#[rstest]
#[tokio::test]
async fn clear_mid_playback_stops_and_empties(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b", "c"], &notifier).await;
    let session = FakeSession::connected();

    queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;

    queue.reset().await;
    settle().await;

    assert!(!session.playing());
    assert!(session.stops() >= 1);
    assert!(queue.is_empty().await);
    assert_eq!(queue.cursor().await, 0);
    assert_eq!(session.plays(), vec!["a"]);
    assert!(!queue.is_driving().await);
}

#[rstest]
#[tokio::test]
async fn stop_keeps_entries_and_cursor(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b"], &notifier).await;
    let session = FakeSession::connected();

    queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;

    queue.stop().await;
    settle().await;

    assert!(!session.playing());
    assert_eq!(queue.len().await, 2);
    assert_eq!(queue.cursor().await, 0);
    assert_eq!(session.plays(), vec!["a"]);
}

#[rstest]
#[tokio::test]
async fn play_if_idle_starts_one_driver(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a", "b"], &notifier).await;
    let session = FakeSession::connected();

    let started = join_all((0..5).map(|_| queue.play_if_idle(session.clone()))).await;

    assert_eq!(started.iter().filter(|started| **started).count(), 1);
    wait_until(|| session.plays() == ["a"]).await;
    settle().await;
    assert_eq!(session.plays(), vec!["a"]);
    assert_eq!(notifier.announced(), vec!["a"]);
}

#[rstest]
#[tokio::test]
async fn play_if_idle_resumes_after_queue_ran_out(notifier: Arc<RecordingNotifier>) {
    let queue = filled_queue(&["a"], &notifier).await;
    let session = FakeSession::connected();

    let driver = queue.spawn_play(session.clone());
    wait_until(|| session.plays() == ["a"]).await;
    session.finish_current();
    driver.await.unwrap();

    queue.enqueue("b", None).await.unwrap();
    assert!(queue.play_if_idle(session.clone()).await);

    wait_until(|| session.plays() == ["a", "b"]).await;
    assert_eq!(queue.cursor().await, 1);
}

#[tokio::test]
async fn set_cursor_without_session_only_moves_index() {
    let queue = filled_queue(&["a", "b", "c"], &RecordingNotifier::new()).await;

    assert_eq!(queue.set_cursor(2).await.unwrap(), 2);
    assert_eq!(queue.set_cursor(10).await.unwrap(), 3);

    assert!(queue.session().await.is_none());
    assert!(!queue.is_driving().await);
}

#[tokio::test]
async fn empty_queue_cannot_be_repositioned() {
    let queue = queue_with(Arc::new(FakeResolver::new()));

    assert_matches!(queue.skip().await, Err(MusicError::EmptyQueue));
    assert_matches!(queue.replay().await, Err(MusicError::EmptyQueue));
}

#[tokio::test]
async fn volume_is_validated_and_applied() {
    let queue = queue_with(Arc::new(FakeResolver::new()));
    let session = FakeSession::connected();
    queue.bind_session(session.clone()).await;

    assert_matches!(
        queue.set_volume(101).await,
        Err(MusicError::InvalidVolume(101))
    );
    assert_eq!(queue.volume().await, 50);

    queue.set_volume(30).await.unwrap();

    assert_eq!(queue.volume().await, 30);
    assert_eq!(session.volume(), Some(0.3));
}

#[tokio::test]
async fn registry_requires_voice_channel_to_create() {
    let manager = MusicManager::new(Arc::new(FakeResolver::new()), settings());
    let notifier = RecordingNotifier::new();

    assert_matches!(
        manager.get_or_create(guild_id(), None, notifier.clone()).await,
        Err(MusicError::NotInVoiceChannel)
    );

    let created = manager
        .get_or_create(guild_id(), Some(voice_channel()), notifier.clone())
        .await
        .unwrap();
    let fetched = manager
        .get_or_create(guild_id(), None, notifier)
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&created, &fetched));
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn evict_resets_and_removes_queue() {
    let manager = MusicManager::new(Arc::new(FakeResolver::new()), settings());
    let queue = manager
        .get_or_create(guild_id(), Some(voice_channel()), RecordingNotifier::new())
        .await
        .unwrap();
    queue.enqueue("a", None).await.unwrap();

    assert!(manager.evict(guild_id()).await);

    assert!(queue.is_empty().await);
    assert!(manager.get(guild_id()).is_none());
    assert!(!manager.evict(guild_id()).await);
}
