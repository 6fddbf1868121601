//! Backend client for the swipe app.
//!
//! This crate defines the collaborator contract the client core depends on,
//! and two implementations of it:
//! - `HttpBackend`: the REST API (bearer-token auth, JSON bodies)
//! - `InMemoryBackend`: seeded in-process data with failure injection and a
//!   call log, for tests and the offline demo
//!
//! Everything persistent (profiles, memes, likes, matches, messages) lives
//! behind this trait; the client core only sees domain types.

use std::sync::Arc;

use async_trait::async_trait;
use model::{
    ChatMessage, Comment, LikeOutcome, Match, MatchId, MediaId, MediaRef, Session, UserId,
    UserSummary,
};
use thiserror::Error;

pub mod http;
pub mod mock;
pub mod wire;

pub use http::HttpBackend;
pub use mock::{CallLog, FailurePlan, InMemoryBackend};

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the server's message when it sent one
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Failure injected by `InMemoryBackend`
    #[error("Injected failure: {0}")]
    Injected(&'static str),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ApiError>;

/// Shared handle to whichever backend the app runs against
pub type SharedBackend = Arc<dyn Backend>;

/// Operations the client core consumes from the backend.
///
/// ## Design Note
/// - `Send + Sync` so calls can run on spawned tasks
/// - Every call is independent; the core never holds a lock across one
#[async_trait]
pub trait Backend: Send + Sync {
    /// Profiles the acting user may be shown, in backend order
    async fn fetch_candidates(&self, session: &Session) -> Result<Vec<UserSummary>>;

    /// Matches the acting user is part of
    async fn fetch_matches(&self, session: &Session) -> Result<Vec<Match>>;

    /// Memes owned by a user
    async fn fetch_media(&self, owner: UserId) -> Result<Vec<MediaRef>>;

    async fn fetch_like_count(&self, media: MediaId) -> Result<u64>;

    async fn fetch_comments(&self, media: MediaId) -> Result<Vec<Comment>>;

    /// Like a user; a mutual like reports `is_match = true`
    async fn submit_like(&self, session: &Session, target: UserId) -> Result<LikeOutcome>;

    async fn submit_reject(&self, session: &Session, target: UserId) -> Result<()>;

    async fn fetch_match(&self, id: MatchId) -> Result<Match>;

    async fn send_message(
        &self,
        match_id: MatchId,
        session: &Session,
        content: &str,
    ) -> Result<ChatMessage>;

    /// Full, ordered message list of a match
    async fn poll_messages(&self, match_id: MatchId) -> Result<Vec<ChatMessage>>;

    /// One user's profile, for the profile view
    async fn fetch_user(&self, id: UserId) -> Result<UserSummary>;

    /// Comment on a meme as the acting user; returns the stored comment
    async fn post_comment(
        &self,
        session: &Session,
        media: MediaId,
        content: &str,
    ) -> Result<Comment>;

    /// Like a single meme. Unlike `submit_like`, this never creates a match.
    async fn like_media(&self, session: &Session, media: MediaId) -> Result<()>;

    async fn unlike_media(&self, session: &Session, media: MediaId) -> Result<()>;

    async fn has_liked_media(&self, session: &Session, media: MediaId) -> Result<bool>;
}
