//! Core domain types for the swipe client.
//!
//! This module defines the data structures shared by every other crate:
//! profiles and their memes, the candidates shown in the feed, the decisions
//! a user commits on them, and the match and chat records returned by the
//! backend.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// These keep user ids, meme ids and match ids apart at the signature level

/// Unique identifier for a user account
pub type UserId = u64;

/// Unique identifier for a meme (a media item owned by a user)
pub type MediaId = u64;

/// Unique identifier for a comment on a meme
pub type CommentId = u64;

/// Unique identifier for a match between two users
pub type MatchId = u64;

/// Unique identifier for a chat message
pub type MessageId = u64;

// =============================================================================
// Session
// =============================================================================

/// The acting user, passed explicitly to every backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    /// Bearer token for the REST backend, if authenticated
    pub token: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

// =============================================================================
// Profile-related Types
// =============================================================================

/// Display attributes of a user, as returned by the candidate listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub bio: String,
    pub tags: Vec<String>,
}

impl UserSummary {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar_url: None,
            bio: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A meme as listed for its owner, before likes and comments are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: MediaId,
    pub image_url: String,
    pub caption: String,
}

impl MediaRef {
    pub fn new(id: MediaId, image_url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            id,
            image_url: image_url.into(),
            caption: caption.into(),
        }
    }
}

/// A comment left on a meme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub author_name: String,
    pub text: String,
}

/// A fully resolved meme: the reference plus its like count and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    pub image_url: String,
    pub caption: String,
    pub like_count: u64,
    pub comments: Vec<Comment>,
}

impl MediaItem {
    /// Build an item from its reference with degraded (empty) engagement.
    pub fn bare(media: MediaRef) -> Self {
        Self {
            id: media.id,
            image_url: media.image_url,
            caption: media.caption,
            like_count: 0,
            comments: Vec::new(),
        }
    }
}

// =============================================================================
// Feed-related Types
// =============================================================================

/// A profile in the swipeable feed.
///
/// A candidate with no media cannot be dragged, but it still occupies its
/// slot in the queue and can be skipped with the like/reject buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub profile: UserSummary,
    pub media: Vec<MediaItem>,
}

impl Candidate {
    pub fn new(profile: UserSummary, media: Vec<MediaItem>) -> Self {
        Self { profile, media }
    }

    pub fn id(&self) -> UserId {
        self.profile.id
    }

    /// Whether the card can be dragged (it has at least one meme to show)
    pub fn is_draggable(&self) -> bool {
        !self.media.is_empty()
    }

    /// Sum of likes across every meme of this candidate
    pub fn total_likes(&self) -> u64 {
        self.media.iter().map(|m| m.like_count).sum()
    }

    pub fn total_comments(&self) -> usize {
        self.media.iter().map(|m| m.comments.len()).sum()
    }
}

/// Which way a card left the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Right is a like, left is a reject
    pub fn is_like(self) -> bool {
        matches!(self, SwipeDirection::Right)
    }

    /// Direction from the sign of a horizontal offset
    pub fn from_offset(dx: f64) -> Self {
        if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    }

    /// +1 for right, -1 for left
    pub fn sign(self) -> f64 {
        match self {
            SwipeDirection::Right => 1.0,
            SwipeDirection::Left => -1.0,
        }
    }
}

/// The committed outcome of one gesture or button press on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeDecision {
    pub candidate: UserId,
    pub direction: SwipeDirection,
}

impl SwipeDecision {
    pub fn new(candidate: UserId, direction: SwipeDirection) -> Self {
        Self {
            candidate,
            direction,
        }
    }
}

/// Session-lifetime like/reject tallies. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub likes: u64,
    pub rejects: u64,
}

impl Counters {
    pub fn record(&mut self, direction: SwipeDirection) {
        match direction {
            SwipeDirection::Right => self.likes += 1,
            SwipeDirection::Left => self.rejects += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.likes + self.rejects
    }
}

// =============================================================================
// Match-related Types
// =============================================================================

/// Backend response to a like
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub is_match: bool,
    pub match_id: Option<MatchId>,
}

/// Raised when a like turned out to be mutual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub candidate: Candidate,
    pub match_id: Option<MatchId>,
}

/// A match record between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub user1: UserSummary,
    pub user2: UserSummary,
}

impl Match {
    /// The other participant, or `None` when `me` is not part of this match
    pub fn counterpart(&self, me: UserId) -> Option<&UserSummary> {
        if self.user1.id == me {
            Some(&self.user2)
        } else if self.user2.id == me {
            Some(&self.user1)
        } else {
            None
        }
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.user1.id == user || self.user2.id == user
    }
}

// =============================================================================
// Chat-related Types
// =============================================================================

/// A chat message inside a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub match_id: MatchId,
    pub sender_id: UserId,
    pub content: String,
    /// ISO-8601 timestamp as reported by the backend
    pub created_at: String,
}
