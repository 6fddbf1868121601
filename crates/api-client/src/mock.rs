//! In-memory `Backend` for tests and the offline demo.
//!
//! Holds users, memes, likes, matches and messages in a `Mutex`, records every
//! call in a `CallLog`, and can be told to fail individual operations through
//! a `FailurePlan`.
//!
//! Candidate listing returns every user, the acting one included, exactly
//! like `GET /users`; exclusion is the feed loader's job.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use model::{
    ChatMessage, Comment, LikeOutcome, Match, MatchId, MediaId, MediaRef, MessageId, Session,
    UserId, UserSummary,
};

use crate::{ApiError, Backend, Result};

/// Every call made against the backend, in arrival order per operation
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    pub fetch_candidates: usize,
    pub fetch_matches: usize,
    pub fetch_media: Vec<UserId>,
    pub like_counts: Vec<MediaId>,
    pub comments: Vec<MediaId>,
    /// (actor, target)
    pub likes: Vec<(UserId, UserId)>,
    /// (actor, target)
    pub rejects: Vec<(UserId, UserId)>,
    pub fetch_match: Vec<MatchId>,
    /// (match, sender, content)
    pub messages_sent: Vec<(MatchId, UserId, String)>,
    pub polls: Vec<MatchId>,
    pub fetch_user: Vec<UserId>,
    /// (meme, author, content)
    pub comments_posted: Vec<(MediaId, UserId, String)>,
    /// (user, meme)
    pub media_likes: Vec<(UserId, MediaId)>,
    /// (user, meme)
    pub media_unlikes: Vec<(UserId, MediaId)>,
    pub like_status: Vec<MediaId>,
}

/// Which operations should fail
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    pub candidates: bool,
    pub matches: bool,
    /// Owners whose meme listing fails
    pub media: HashSet<UserId>,
    pub like_counts: HashSet<MediaId>,
    pub comments: HashSet<MediaId>,
    pub likes: bool,
    pub rejects: bool,
    pub send: bool,
    pub poll: bool,
    pub comment: bool,
    /// Liking, unliking and checking a single meme
    pub media_likes: bool,
}

#[derive(Default)]
struct Store {
    users: Vec<UserSummary>,
    media: HashMap<UserId, Vec<MediaRef>>,
    like_counts: HashMap<MediaId, u64>,
    comments: HashMap<MediaId, Vec<Comment>>,
    /// (liker, liked)
    likes: HashSet<(UserId, UserId)>,
    /// (user, meme)
    media_likes: HashSet<(UserId, MediaId)>,
    matches: Vec<Match>,
    messages: HashMap<MatchId, Vec<ChatMessage>>,
    next_match_id: MatchId,
    next_message_id: MessageId,
    failures: FailurePlan,
    like_latency: Option<Duration>,
}

impl Store {
    fn summary(&self, id: UserId) -> UserSummary {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .unwrap_or_else(|| UserSummary::new(id, format!("user{}", id)))
    }

    fn user(&self, id: UserId) -> Option<&UserSummary> {
        self.users.iter().find(|u| u.id == id)
    }

    fn has_media(&self, media: MediaId) -> bool {
        self.media.values().flatten().any(|m| m.id == media)
    }

    fn push_comment(&mut self, media: MediaId, author: UserId, text: &str) -> Comment {
        let id = self
            .comments
            .values()
            .flatten()
            .map(|c| c.id)
            .max()
            .unwrap_or(0)
            + 1;
        let comment = Comment {
            id,
            author_id: author,
            author_name: self.summary(author).name,
            text: text.to_string(),
        };
        self.comments.entry(media).or_default().push(comment.clone());
        comment
    }

    fn match_between(&self, a: UserId, b: UserId) -> Option<&Match> {
        self.matches
            .iter()
            .find(|m| m.involves(a) && m.involves(b))
    }

    fn create_match(&mut self, a: UserId, b: UserId) -> MatchId {
        if let Some(existing) = self.match_between(a, b) {
            return existing.id;
        }
        self.next_match_id += 1;
        let id = self.next_match_id;
        let record = Match {
            id,
            user1: self.summary(a),
            user2: self.summary(b),
        };
        self.matches.push(record);
        id
    }

    fn push_message(&mut self, match_id: MatchId, sender: UserId, content: &str) -> ChatMessage {
        self.next_message_id += 1;
        let id = self.next_message_id;
        let message = ChatMessage {
            id,
            match_id,
            sender_id: sender,
            content: content.to_string(),
            created_at: format!("2024-01-15T10:{:02}:{:02}Z", (id / 60) % 60, id % 60),
        };
        self.messages
            .entry(match_id)
            .or_default()
            .push(message.clone());
        message
    }
}

/// Seeded in-process backend.
///
/// Match ids are assigned from 1 in creation order, whether the match is
/// seeded with `with_match` or created by a mutual like.
#[derive(Default)]
pub struct InMemoryBackend {
    store: Mutex<Store>,
    calls: Mutex<CallLog>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self) -> MutexGuard<'_, CallLog> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_user(self, user: UserSummary) -> Self {
        self.store().users.push(user);
        self
    }

    /// Add a meme owned by `owner` with its like count and comments
    pub fn with_meme(
        self,
        owner: UserId,
        media: MediaRef,
        likes: u64,
        comments: Vec<Comment>,
    ) -> Self {
        {
            let mut store = self.store();
            store.like_counts.insert(media.id, likes);
            store.comments.insert(media.id, comments);
            store.media.entry(owner).or_default().push(media);
        }
        self
    }

    /// Record that `liker` already liked `liked`
    pub fn with_like(self, liker: UserId, liked: UserId) -> Self {
        self.store().likes.insert((liker, liked));
        self
    }

    pub fn with_match(self, a: UserId, b: UserId) -> Self {
        self.store().create_match(a, b);
        self
    }

    pub fn with_message(self, match_id: MatchId, sender: UserId, content: &str) -> Self {
        self.store().push_message(match_id, sender, content);
        self
    }

    /// Delay every like response by `latency`
    pub fn with_like_latency(self, latency: Duration) -> Self {
        self.store().like_latency = Some(latency);
        self
    }

    pub fn with_failures(self, failures: FailurePlan) -> Self {
        self.store().failures = failures;
        self
    }

    /// Change the failure plan at runtime
    pub fn set_failures(&self, update: impl FnOnce(&mut FailurePlan)) {
        update(&mut self.store().failures);
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> CallLog {
        self.log().clone()
    }

    /// Record that `user` already liked the meme `media`
    pub fn with_media_like(self, user: UserId, media: MediaId) -> Self {
        {
            let mut store = self.store();
            if store.media_likes.insert((user, media)) {
                *store.like_counts.entry(media).or_insert(0) += 1;
            }
        }
        self
    }

    pub fn matches_of(&self, user: UserId) -> Vec<Match> {
        self.store()
            .matches
            .iter()
            .filter(|m| m.involves(user))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn fetch_candidates(&self, _session: &Session) -> Result<Vec<UserSummary>> {
        self.log().fetch_candidates += 1;
        let store = self.store();
        if store.failures.candidates {
            return Err(ApiError::Injected("fetch candidates"));
        }
        Ok(store.users.clone())
    }

    async fn fetch_matches(&self, session: &Session) -> Result<Vec<Match>> {
        self.log().fetch_matches += 1;
        if self.store().failures.matches {
            return Err(ApiError::Injected("fetch matches"));
        }
        Ok(self.matches_of(session.user_id))
    }

    async fn fetch_media(&self, owner: UserId) -> Result<Vec<MediaRef>> {
        self.log().fetch_media.push(owner);
        let store = self.store();
        if store.failures.media.contains(&owner) {
            return Err(ApiError::Injected("fetch media"));
        }
        Ok(store.media.get(&owner).cloned().unwrap_or_default())
    }

    async fn fetch_like_count(&self, media: MediaId) -> Result<u64> {
        self.log().like_counts.push(media);
        let store = self.store();
        if store.failures.like_counts.contains(&media) {
            return Err(ApiError::Injected("fetch like count"));
        }
        Ok(store.like_counts.get(&media).copied().unwrap_or(0))
    }

    async fn fetch_comments(&self, media: MediaId) -> Result<Vec<Comment>> {
        self.log().comments.push(media);
        let store = self.store();
        if store.failures.comments.contains(&media) {
            return Err(ApiError::Injected("fetch comments"));
        }
        Ok(store.comments.get(&media).cloned().unwrap_or_default())
    }

    async fn submit_like(&self, session: &Session, target: UserId) -> Result<LikeOutcome> {
        self.log().likes.push((session.user_id, target));

        let (latency, failing) = {
            let store = self.store();
            (store.like_latency, store.failures.likes)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(ApiError::Injected("submit like"));
        }

        let mut store = self.store();
        store.likes.insert((session.user_id, target));
        if store.likes.contains(&(target, session.user_id)) {
            let match_id = store.create_match(session.user_id, target);
            debug!("Mutual like {} <-> {} (match {})", session.user_id, target, match_id);
            return Ok(LikeOutcome {
                is_match: true,
                match_id: Some(match_id),
            });
        }
        Ok(LikeOutcome::default())
    }

    async fn submit_reject(&self, session: &Session, target: UserId) -> Result<()> {
        self.log().rejects.push((session.user_id, target));
        if self.store().failures.rejects {
            return Err(ApiError::Injected("submit reject"));
        }
        Ok(())
    }

    async fn fetch_match(&self, id: MatchId) -> Result<Match> {
        self.log().fetch_match.push(id);
        self.store()
            .matches
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(ApiError::NotFound { entity: "match", id })
    }

    async fn send_message(
        &self,
        match_id: MatchId,
        session: &Session,
        content: &str,
    ) -> Result<ChatMessage> {
        self.log()
            .messages_sent
            .push((match_id, session.user_id, content.to_string()));
        let mut store = self.store();
        if store.failures.send {
            return Err(ApiError::Injected("send message"));
        }
        if !store.matches.iter().any(|m| m.id == match_id) {
            return Err(ApiError::NotFound {
                entity: "match",
                id: match_id,
            });
        }
        Ok(store.push_message(match_id, session.user_id, content))
    }

    async fn poll_messages(&self, match_id: MatchId) -> Result<Vec<ChatMessage>> {
        self.log().polls.push(match_id);
        let store = self.store();
        if store.failures.poll {
            return Err(ApiError::Injected("poll messages"));
        }
        Ok(store.messages.get(&match_id).cloned().unwrap_or_default())
    }

    async fn fetch_user(&self, id: UserId) -> Result<UserSummary> {
        self.log().fetch_user.push(id);
        self.store()
            .user(id)
            .cloned()
            .ok_or(ApiError::NotFound { entity: "user", id })
    }

    async fn post_comment(
        &self,
        session: &Session,
        media: MediaId,
        content: &str,
    ) -> Result<Comment> {
        self.log()
            .comments_posted
            .push((media, session.user_id, content.to_string()));
        let mut store = self.store();
        if store.failures.comment {
            return Err(ApiError::Injected("post comment"));
        }
        if !store.has_media(media) {
            return Err(ApiError::NotFound {
                entity: "meme",
                id: media,
            });
        }
        Ok(store.push_comment(media, session.user_id, content))
    }

    async fn like_media(&self, session: &Session, media: MediaId) -> Result<()> {
        self.log().media_likes.push((session.user_id, media));
        let mut store = self.store();
        if store.failures.media_likes {
            return Err(ApiError::Injected("like meme"));
        }
        if !store.has_media(media) {
            return Err(ApiError::NotFound {
                entity: "meme",
                id: media,
            });
        }
        if !store.media_likes.insert((session.user_id, media)) {
            return Err(ApiError::Status {
                status: 400,
                message: "Meme already liked".to_string(),
            });
        }
        *store.like_counts.entry(media).or_insert(0) += 1;
        Ok(())
    }

    async fn unlike_media(&self, session: &Session, media: MediaId) -> Result<()> {
        self.log().media_unlikes.push((session.user_id, media));
        let mut store = self.store();
        if store.failures.media_likes {
            return Err(ApiError::Injected("unlike meme"));
        }
        if !store.media_likes.remove(&(session.user_id, media)) {
            return Err(ApiError::NotFound {
                entity: "like on meme",
                id: media,
            });
        }
        if let Some(count) = store.like_counts.get_mut(&media) {
            *count = count.saturating_sub(1);
        }
        Ok(())
    }

    async fn has_liked_media(&self, session: &Session, media: MediaId) -> Result<bool> {
        self.log().like_status.push(media);
        let store = self.store();
        if store.failures.media_likes {
            return Err(ApiError::Injected("check meme like"));
        }
        Ok(store.media_likes.contains(&(session.user_id, media)))
    }
}
