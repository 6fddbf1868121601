//! Integration tests for the feed crate.
//!
//! These run the loader against the in-memory backend and feed its batches
//! through the sequencer, the way the session driver does.

use std::sync::Arc;

use api_client::{Backend, FailurePlan, InMemoryBackend};
use feed::{FeedCommand, FeedLoader, FeedSequencer, FeedStatus};
use model::{Candidate, Comment, MediaRef, Session, SwipeDecision, SwipeDirection, UserSummary};

fn create_test_backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_user(UserSummary::new(1, "You"))
        .with_user(UserSummary::new(2, "MemeKing").with_tags(["funny", "cats"]))
        .with_user(UserSummary::new(3, "CodeJoker"))
        .with_user(UserSummary::new(4, "MemeLord"))
        .with_meme(
            2,
            MediaRef::new(20, "/monday.png", "Monday again"),
            1234,
            vec![Comment {
                id: 1,
                author_id: 3,
                author_name: "CodeJoker".to_string(),
                text: "same".to_string(),
            }],
        )
        .with_meme(3, MediaRef::new(30, "/bug.png", "It works on my machine"), 567, vec![])
        .with_like(4, 1)
}

fn ids(candidates: &[Candidate]) -> Vec<u64> {
    candidates.iter().map(Candidate::id).collect()
}

#[tokio::test]
async fn test_load_excludes_self_in_backend_order() {
    let backend = Arc::new(create_test_backend());
    let loader = FeedLoader::new(backend.clone(), Session::new(1, "You"));

    let candidates = loader.load().await.unwrap();

    assert_eq!(ids(&candidates), vec![2, 3, 4]);
    assert_eq!(candidates[0].total_likes(), 1234);
    assert_eq!(candidates[0].total_comments(), 1);
    assert!(!candidates[2].is_draggable(), "MemeLord has no memes");
    assert_eq!(backend.calls().fetch_matches, 1);
}

#[tokio::test]
async fn test_comment_failure_still_completes_batch() {
    let backend = Arc::new(create_test_backend().with_failures(FailurePlan {
        comments: [20].into_iter().collect(),
        ..FailurePlan::default()
    }));
    let loader = FeedLoader::new(backend, Session::new(1, "You"));
    let mut feed = FeedSequencer::new();

    let FeedCommand::Fetch { generation } = feed.begin_load() else {
        panic!("expected a fetch");
    };
    let batch = loader.load().await.map_err(|e| format!("{:#}", e));
    feed.complete_load(generation, batch);

    assert_eq!(feed.status(), &FeedStatus::Ready);
    let current = feed.current().unwrap();
    assert_eq!(current.media[0].like_count, 1234);
    assert!(current.media[0].comments.is_empty());
}

#[tokio::test]
async fn test_listing_failure_fails_load() {
    let backend = Arc::new(create_test_backend().with_failures(FailurePlan {
        candidates: true,
        ..FailurePlan::default()
    }));
    let loader = FeedLoader::new(backend, Session::new(1, "You"));

    let err = loader.load().await.unwrap_err();

    assert!(
        format!("{:#}", err).contains("Failed to fetch candidates"),
        "Error should carry context: {:#}",
        err
    );
}

#[tokio::test]
async fn test_matched_user_gone_after_reload() {
    let backend = Arc::new(create_test_backend());
    let session = Session::new(1, "You");
    let loader = FeedLoader::new(backend.clone(), session.clone());

    let before = loader.load().await.unwrap();
    assert!(ids(&before).contains(&4));

    let outcome = backend.submit_like(&session, 4).await.unwrap();
    assert!(outcome.is_match);

    let after = loader.load().await.unwrap();
    assert_eq!(ids(&after), vec![2, 3]);
}

#[tokio::test]
async fn test_full_pass_requests_one_reload() {
    let backend = Arc::new(create_test_backend());
    let loader = FeedLoader::new(backend, Session::new(1, "You"));
    let mut feed = FeedSequencer::new();

    let FeedCommand::Fetch { generation } = feed.begin_load() else {
        panic!("expected a fetch");
    };
    feed.complete_load(generation, Ok(loader.load().await.unwrap()));

    let mut fetches = Vec::new();
    let mut likes = 0;
    while let Some(id) = feed.current().map(Candidate::id) {
        for command in feed.apply(SwipeDecision::new(id, SwipeDirection::Right)).unwrap() {
            match command {
                FeedCommand::Fetch { generation } => fetches.push(generation),
                FeedCommand::SubmitLike { .. } => likes += 1,
                FeedCommand::SubmitReject { .. } => {}
            }
        }
    }

    assert_eq!(likes, 3);
    assert_eq!(fetches, vec![2]);
    assert_eq!(feed.counters().likes, 3);
}
