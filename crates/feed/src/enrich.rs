//! Concurrent enrichment of candidate profiles.
//!
//! A profile from the candidate listing only carries display attributes. To
//! become a `Candidate` it needs its memes, and every meme needs its like
//! count and comments.
//!
//! ## Algorithm
//! 1. All profiles are enriched at once with `join_all`
//! 2. Per profile: fetch the meme list, then all memes at once
//! 3. Per meme: like count and comments concurrently with `tokio::join!`
//!
//! Nothing in here fails. A meme list that cannot be fetched leaves the
//! candidate with no memes; a like count that cannot be fetched becomes 0;
//! comments that cannot be fetched become an empty list. `join_all` keeps
//! input order, so candidates come out in backend order.

use futures::future::join_all;
use tracing::{debug, warn};

use api_client::Backend;
use model::{Candidate, MediaItem, MediaRef, UserSummary};

/// Enrich every profile concurrently, preserving order.
pub async fn enrich_all(backend: &dyn Backend, profiles: Vec<UserSummary>) -> Vec<Candidate> {
    join_all(
        profiles
            .into_iter()
            .map(|profile| enrich_profile(backend, profile)),
    )
    .await
}

/// Resolve one profile into a candidate with its memes.
pub async fn enrich_profile(backend: &dyn Backend, profile: UserSummary) -> Candidate {
    let refs = match backend.fetch_media(profile.id).await {
        Ok(refs) => refs,
        Err(e) => {
            warn!("Failed to fetch memes for user {}: {}", profile.id, e);
            Vec::new()
        }
    };

    let media = join_all(refs.into_iter().map(|media| enrich_media(backend, media))).await;
    debug!(
        "Enriched user {} with {} memes",
        profile.id,
        media.len()
    );
    Candidate::new(profile, media)
}

async fn enrich_media(backend: &dyn Backend, media: MediaRef) -> MediaItem {
    let id = media.id;
    let (like_count, comments) =
        tokio::join!(backend.fetch_like_count(id), backend.fetch_comments(id));

    let mut item = MediaItem::bare(media);
    match like_count {
        Ok(count) => item.like_count = count,
        Err(e) => warn!("Failed to fetch like count for meme {}: {}", id, e),
    }
    match comments {
        Ok(comments) => item.comments = comments,
        Err(e) => warn!("Failed to fetch comments for meme {}: {}", id, e),
    }
    item
}
