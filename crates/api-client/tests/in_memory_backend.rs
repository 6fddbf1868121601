//! Integration tests for the in-memory backend.
//!
//! The feed and session crates lean on this backend for their own tests, so
//! its match and failure semantics are pinned down here.

use api_client::{ApiError, Backend, FailurePlan, InMemoryBackend};
use model::{MediaRef, Session, UserSummary};

fn seeded() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_user(UserSummary::new(1, "You"))
        .with_user(UserSummary::new(2, "MemeKing"))
        .with_user(UserSummary::new(3, "CodeJoker"))
        .with_meme(2, MediaRef::new(20, "/cat.png", "Monday again"), 1234, vec![])
        .with_like(3, 1)
}

#[tokio::test]
async fn test_candidates_include_everyone_in_order() {
    let backend = seeded();
    let session = Session::new(1, "You");

    let users = backend.fetch_candidates(&session).await.unwrap();
    let ids: Vec<_> = users.iter().map(|u| u.id).collect();

    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(backend.calls().fetch_candidates, 1);
}

#[tokio::test]
async fn test_one_sided_like_is_not_a_match() {
    let backend = seeded();
    let session = Session::new(1, "You");

    let outcome = backend.submit_like(&session, 2).await.unwrap();

    assert!(!outcome.is_match);
    assert!(backend.matches_of(1).is_empty());
    assert_eq!(backend.calls().likes, vec![(1, 2)]);
}

#[tokio::test]
async fn test_mutual_like_creates_match() {
    let backend = seeded();
    let session = Session::new(1, "You");

    let outcome = backend.submit_like(&session, 3).await.unwrap();

    assert!(outcome.is_match);
    assert_eq!(outcome.match_id, Some(1));
    let matches = backend.fetch_matches(&session).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].counterpart(1).map(|u| u.name.as_str()), Some("CodeJoker"));
}

#[tokio::test]
async fn test_injected_failures() {
    let backend = seeded().with_failures(FailurePlan {
        likes: true,
        ..FailurePlan::default()
    });
    let session = Session::new(1, "You");

    let result = backend.submit_like(&session, 3).await;
    assert!(matches!(result, Err(ApiError::Injected(_))));
    assert!(backend.matches_of(1).is_empty(), "failed like records nothing");

    backend.set_failures(|plan| {
        plan.comments.insert(20);
    });
    assert!(backend.fetch_comments(20).await.is_err());
    assert_eq!(backend.fetch_like_count(20).await.unwrap(), 1234);
}

#[tokio::test]
async fn test_messages_round_trip_through_match() {
    let backend = seeded().with_match(1, 2).with_message(1, 2, "hey");
    let session = Session::new(1, "You");

    let sent = backend.send_message(1, &session, "hi back").await.unwrap();
    let all = backend.poll_messages(1).await.unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(all[1], sent);
    assert_eq!(all[0].sender_id, 2);
}

#[tokio::test]
async fn test_unknown_match() {
    let backend = seeded();
    let err = backend.fetch_match(99).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { id: 99, .. }));
}

#[tokio::test]
async fn test_meme_like_toggle_moves_count() {
    let backend = seeded();
    let session = Session::new(1, "You");

    assert!(!backend.has_liked_media(&session, 20).await.unwrap());
    backend.like_media(&session, 20).await.unwrap();
    assert!(backend.has_liked_media(&session, 20).await.unwrap());
    assert_eq!(backend.fetch_like_count(20).await.unwrap(), 1235);

    let again = backend.like_media(&session, 20).await.unwrap_err();
    assert!(matches!(again, ApiError::Status { status: 400, .. }));

    backend.unlike_media(&session, 20).await.unwrap();
    assert!(!backend.has_liked_media(&session, 20).await.unwrap());
    assert_eq!(backend.fetch_like_count(20).await.unwrap(), 1234);
    assert!(backend.matches_of(1).is_empty(), "Meme likes never match");
}

#[tokio::test]
async fn test_posted_comment_is_listed() {
    let backend = seeded();
    let session = Session::new(1, "You");

    let comment = backend.post_comment(&session, 20, "mood").await.unwrap();
    let listed = backend.fetch_comments(20).await.unwrap();

    assert_eq!(comment.author_name, "You");
    assert_eq!(listed, vec![comment]);
    assert!(matches!(
        backend.post_comment(&session, 99, "?").await,
        Err(ApiError::NotFound { id: 99, .. })
    ));
}

#[tokio::test]
async fn test_fetch_user() {
    let backend = seeded();
    assert_eq!(backend.fetch_user(2).await.unwrap().name, "MemeKing");
    assert!(matches!(
        backend.fetch_user(42).await,
        Err(ApiError::NotFound { id: 42, .. })
    ));
    assert_eq!(backend.calls().fetch_user, vec![2, 42]);
}
