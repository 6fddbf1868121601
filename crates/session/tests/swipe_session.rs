//! End-to-end tests for the swipe session driver.
//!
//! All of these run on a paused clock, so the overlay timings are exact.

use std::sync::Arc;
use std::time::Duration;

use api_client::{FailurePlan, InMemoryBackend};
use feed::FeedStatus;
use gesture::Point;
use model::{Candidate, Counters, MediaRef, Session, UserSummary};
use session::{ClientConfig, FeedView, SessionHandle, SwipeSession, UiEvent};
use tokio::time::{sleep, Instant};

const ME: u64 = 1;

fn with_memes(backend: InMemoryBackend, owners: &[u64]) -> InMemoryBackend {
    owners.iter().fold(backend, |backend, &owner| {
        backend
            .with_user(UserSummary::new(owner, format!("user{}", owner)))
            .with_meme(
                owner,
                MediaRef::new(owner * 10, format!("/meme{}.png", owner), "caption"),
                5,
                vec![],
            )
    })
}

fn base() -> InMemoryBackend {
    InMemoryBackend::new().with_user(UserSummary::new(ME, "You"))
}

fn start(backend: &Arc<InMemoryBackend>) -> SessionHandle {
    SwipeSession::spawn(
        backend.clone(),
        Session::new(ME, "You"),
        ClientConfig::default(),
    )
}

fn current_id(view: &FeedView) -> Option<u64> {
    view.current.as_ref().map(Candidate::id)
}

async fn drag(handle: &SessionHandle, dx: f64) {
    handle.send(UiEvent::PointerDown(Point::new(200.0, 300.0))).await.unwrap();
    handle
        .send(UiEvent::PointerMove(Point::new(200.0 + dx / 2.0, 302.0)))
        .await
        .unwrap();
    handle
        .send(UiEvent::PointerMove(Point::new(200.0 + dx, 305.0)))
        .await
        .unwrap();
    handle.send(UiEvent::PointerUp).await.unwrap();
}

/// Paused time lands on the deadline; allow for millisecond rounding
fn assert_within(elapsed: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(20),
        "expected ~{:?}, got {:?}",
        expected,
        elapsed
    );
}

async fn ready(handle: &SessionHandle) -> FeedView {
    handle
        .wait_for(|view| view.status == FeedStatus::Ready)
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_first_batch_shows_current_and_preview() {
    let backend = Arc::new(with_memes(base(), &[2, 3]));
    let handle = start(&backend);

    let view = ready(&handle).await;

    assert_eq!(current_id(&view), Some(2), "Own profile is never shown");
    assert_eq!(view.preview.as_ref().map(Candidate::id), Some(3));
    assert_eq!(view.counters, Counters::default());
    assert_eq!(view.card.opacity, 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_right_drag_likes_and_advances() {
    let backend = Arc::new(with_memes(base(), &[2, 3]));
    let handle = start(&backend);
    ready(&handle).await;

    drag(&handle, 150.0).await;
    let view = handle
        .wait_for(|view| current_id(view) == Some(3))
        .await
        .unwrap();

    assert_eq!(view.counters, Counters { likes: 1, rejects: 0 });
    assert!(view.like_burst);
    assert!(view.preview.is_none());

    let shown = Instant::now();
    let view = handle.wait_for(|view| !view.like_burst).await.unwrap();
    assert_within(shown.elapsed(), 800);
    assert!(view.celebration.is_none(), "One-sided like is not a match");
    assert_eq!(backend.calls().likes, vec![(ME, 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_left_drag_never_likes() {
    let backend = Arc::new(with_memes(base(), &[2, 3]));
    let handle = start(&backend);
    ready(&handle).await;

    drag(&handle, -150.0).await;
    let view = handle
        .wait_for(|view| current_id(view) == Some(3))
        .await
        .unwrap();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(view.counters, Counters { likes: 0, rejects: 1 });
    assert!(!view.like_burst);
    assert!(backend.calls().likes.is_empty());
    assert_eq!(backend.calls().rejects, vec![(ME, 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_short_drag_snaps_back() {
    let backend = Arc::new(with_memes(base(), &[2, 3]));
    let handle = start(&backend);
    ready(&handle).await;

    drag(&handle, 60.0).await;
    sleep(Duration::from_secs(1)).await;

    let view = handle.view();
    assert_eq!(current_id(&view), Some(2));
    assert_eq!(view.card.offset, Point::ORIGIN);
    assert_eq!(view.counters.total(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_media_candidate_skippable_by_button() {
    let backend = Arc::new(with_memes(
        base().with_user(UserSummary::new(2, "NoMemes")),
        &[3],
    ));
    let handle = start(&backend);
    let view = ready(&handle).await;
    assert_eq!(current_id(&view), Some(2));

    drag(&handle, 200.0).await;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(current_id(&handle.view()), Some(2), "Drag is ignored");

    handle.send(UiEvent::Reject).await.unwrap();
    let view = handle
        .wait_for(|view| current_id(view) == Some(3))
        .await
        .unwrap();
    assert_eq!(view.counters.rejects, 1);
}

#[tokio::test(start_paused = true)]
async fn test_match_on_last_card() {
    let backend = Arc::new(with_memes(base(), &[2]).with_like(2, ME));
    let handle = start(&backend);
    ready(&handle).await;

    let liked_at = Instant::now();
    handle.send(UiEvent::Like).await.unwrap();

    let view = handle
        .wait_for(|view| view.celebration.is_some())
        .await
        .unwrap();
    assert_within(liked_at.elapsed(), 800);
    assert_eq!(view.celebration.as_ref().map(Candidate::id), Some(2));
    assert_eq!(view.counters.likes, 1);

    let shown_at = Instant::now();
    handle
        .wait_for(|view| view.celebration.is_none())
        .await
        .unwrap();
    assert_within(shown_at.elapsed(), 3000);

    sleep(Duration::from_millis(50)).await;
    assert_eq!(
        handle.view().status,
        FeedStatus::Exhausted,
        "The matched user is filtered out of the reload"
    );
    assert_eq!(
        backend.calls().fetch_candidates,
        3,
        "Initial load, drained queue, dismissal"
    );
}

async fn settle_after_match(tap: bool) -> (FeedView, usize) {
    let backend = Arc::new(with_memes(base(), &[2]).with_like(2, ME));
    let handle = start(&backend);
    ready(&handle).await;

    handle.send(UiEvent::Like).await.unwrap();
    handle
        .wait_for(|view| view.celebration.is_some())
        .await
        .unwrap();
    if tap {
        handle.send(UiEvent::TapOverlay).await.unwrap();
    }
    handle
        .wait_for(|view| view.celebration.is_none())
        .await
        .unwrap();
    sleep(Duration::from_millis(50)).await;

    (handle.view(), backend.calls().fetch_candidates)
}

#[tokio::test(start_paused = true)]
async fn test_tap_and_timeout_dismiss_identically() {
    let (tapped, tapped_loads) = settle_after_match(true).await;
    let (timed, timed_loads) = settle_after_match(false).await;

    assert_eq!(tapped, timed);
    assert_eq!(tapped_loads, timed_loads);
}

#[tokio::test(start_paused = true)]
async fn test_input_ignored_during_celebration() {
    let backend = Arc::new(with_memes(base(), &[2, 3, 4]).with_like(2, ME));
    let handle = start(&backend);
    ready(&handle).await;

    handle.send(UiEvent::Like).await.unwrap();
    handle
        .wait_for(|view| view.celebration.is_some())
        .await
        .unwrap();

    handle.send(UiEvent::Reject).await.unwrap();
    drag(&handle, -300.0).await;
    handle.send(UiEvent::TapOverlay).await.unwrap();

    let view = handle
        .wait_for(|view| view.status == FeedStatus::Ready && view.celebration.is_none())
        .await
        .unwrap();
    assert_eq!(view.counters, Counters { likes: 1, rejects: 0 });
    assert_eq!(current_id(&view), Some(3), "Reload drops the matched user");
    assert!(backend.calls().rejects.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_celebration() {
    let backend = Arc::new(with_memes(base(), &[2, 3]).with_like(2, ME));
    let handle = start(&backend);
    let mut views = handle.subscribe();
    ready(&handle).await;

    handle.send(UiEvent::Like).await.unwrap();
    handle
        .wait_for(|view| view.counters.likes == 1)
        .await
        .unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.matches_of(ME).len(), 1);

    handle.shutdown().await;
    let loads = backend.calls().fetch_candidates;
    sleep(Duration::from_secs(10)).await;

    assert_eq!(backend.calls().fetch_candidates, loads, "No reload after shutdown");
    assert!(views.borrow_and_update().celebration.is_none());
    assert!(views.changed().await.is_err(), "Session published nothing more");
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_and_retry() {
    let backend = Arc::new(with_memes(base(), &[2]).with_failures(FailurePlan {
        candidates: true,
        ..FailurePlan::default()
    }));
    let handle = start(&backend);

    let view = handle
        .wait_for(|view| matches!(view.status, FeedStatus::Failed { .. }))
        .await
        .unwrap();
    let error = view.load_error.unwrap_or_default();
    assert!(error.contains("Failed to fetch candidates"), "got: {}", error);

    backend.set_failures(|plan| plan.candidates = false);
    handle.send(UiEvent::Retry).await.unwrap();

    let view = ready(&handle).await;
    assert_eq!(current_id(&view), Some(2));
    assert!(view.load_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_like_keeps_local_decision() {
    let backend = Arc::new(with_memes(base(), &[2, 3]).with_failures(FailurePlan {
        likes: true,
        ..FailurePlan::default()
    }));
    let handle = start(&backend);
    ready(&handle).await;

    handle.send(UiEvent::Like).await.unwrap();
    let view = handle
        .wait_for(|view| current_id(view) == Some(3))
        .await
        .unwrap();
    sleep(Duration::from_secs(5)).await;

    assert_eq!(view.counters.likes, 1);
    assert_eq!(current_id(&handle.view()), Some(3), "Nothing is rolled back");
    assert_eq!(backend.calls().likes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dismissal_during_fly_off_keeps_committed_swipe() {
    let backend = Arc::new(with_memes(base(), &[2, 3, 4]).with_like(2, ME));
    let handle = start(&backend);
    ready(&handle).await;

    let liked_at = Instant::now();
    handle.send(UiEvent::Like).await.unwrap();
    handle
        .wait_for(|view| current_id(view) == Some(3))
        .await
        .unwrap();

    // Commit a swipe that is still leaving the screen when the match shows
    tokio::time::sleep_until(liked_at + Duration::from_millis(650)).await;
    drag(&handle, 200.0).await;
    handle
        .wait_for(|view| view.celebration.is_some())
        .await
        .unwrap();
    assert_eq!(handle.view().counters.likes, 1, "Card 3 has not settled yet");

    backend.set_failures(|plan| plan.candidates = true);
    handle.send(UiEvent::TapOverlay).await.unwrap();

    let view = handle
        .wait_for(|view| matches!(view.status, FeedStatus::Failed { .. }))
        .await
        .unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(view.counters, Counters { likes: 2, rejects: 0 });
    assert_eq!(backend.calls().likes, vec![(ME, 2), (ME, 3)]);
    assert_eq!(
        backend.calls().fetch_candidates,
        2,
        "Initial load, then one reload after the card settled"
    );
}
