//! Profile view: one user with all their memes, plus what the acting user
//! can do there (like or unlike a meme, comment on it).
//!
//! Loading reuses candidate enrichment, so the same per-item degradation
//! applies. Like statuses are checked concurrently; a status that cannot be
//! fetched counts as not liked.
//!
//! Mutations only touch local state after the backend accepted them.

use std::collections::HashSet;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info, warn};

use api_client::Backend;
use model::{Comment, MediaId, MediaItem, Session, UserId, UserSummary};

use crate::enrich::enrich_profile;
use crate::error::ProfileError;

/// Aggregates shown in the profile header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileStats {
    pub total_memes: usize,
    pub total_likes: u64,
}

/// A loaded profile and the acting user's likes on its memes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub profile: UserSummary,
    pub media: Vec<MediaItem>,
    liked: HashSet<MediaId>,
}

impl ProfileView {
    /// Fetch a user and resolve their memes.
    ///
    /// # Arguments
    /// * `backend` - Where profiles, memes and likes come from
    /// * `session` - The acting user, whose like statuses are checked
    /// * `user` - The profile to open
    ///
    /// Fails only when the user itself cannot be fetched.
    pub async fn load(backend: &dyn Backend, session: &Session, user: UserId) -> Result<Self> {
        let profile = backend
            .fetch_user(user)
            .await
            .with_context(|| format!("Failed to fetch user {}", user))?;

        let candidate = enrich_profile(backend, profile).await;
        let statuses = join_all(candidate.media.iter().map(|item| async move {
            match backend.has_liked_media(session, item.id).await {
                Ok(liked) => (item.id, liked),
                Err(e) => {
                    warn!("Failed to check like status for meme {}: {}", item.id, e);
                    (item.id, false)
                }
            }
        }))
        .await;
        let liked = statuses
            .into_iter()
            .filter(|(_, liked)| *liked)
            .map(|(id, _)| id)
            .collect();

        info!(
            "Loaded profile of user {} with {} memes",
            user,
            candidate.media.len()
        );
        Ok(Self {
            profile: candidate.profile,
            media: candidate.media,
            liked,
        })
    }

    pub fn stats(&self) -> ProfileStats {
        ProfileStats {
            total_memes: self.media.len(),
            total_likes: self.media.iter().map(|m| m.like_count).sum(),
        }
    }

    pub fn is_liked(&self, media: MediaId) -> bool {
        self.liked.contains(&media)
    }

    pub fn media(&self, media: MediaId) -> Option<&MediaItem> {
        self.media.iter().find(|m| m.id == media)
    }

    /// Like the meme if the acting user has not, unlike it otherwise.
    ///
    /// Returns whether the meme is liked afterwards. On failure nothing
    /// changes locally.
    pub async fn toggle_like(
        &mut self,
        backend: &dyn Backend,
        session: &Session,
        media: MediaId,
    ) -> Result<bool, ProfileError> {
        let index = self.index_of(media)?;
        let liked = self.liked.contains(&media);

        if liked {
            backend.unlike_media(session, media).await?;
            self.liked.remove(&media);
            let item = &mut self.media[index];
            item.like_count = item.like_count.saturating_sub(1);
        } else {
            backend.like_media(session, media).await?;
            self.liked.insert(media);
            self.media[index].like_count += 1;
        }
        debug!("Meme {} liked: {}", media, !liked);
        Ok(!liked)
    }

    /// Post a comment and append it to the meme's comment list.
    pub async fn add_comment(
        &mut self,
        backend: &dyn Backend,
        session: &Session,
        media: MediaId,
        text: &str,
    ) -> Result<Comment, ProfileError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ProfileError::EmptyComment);
        }
        let index = self.index_of(media)?;

        let comment = backend.post_comment(session, media, text).await?;
        self.media[index].comments.push(comment.clone());
        Ok(comment)
    }

    fn index_of(&self, media: MediaId) -> Result<usize, ProfileError> {
        self.media
            .iter()
            .position(|m| m.id == media)
            .ok_or(ProfileError::UnknownMedia(media))
    }
}
