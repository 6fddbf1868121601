//! # Model Crate
//!
//! Domain types shared across the swipe client.
//!
//! ## Main Components
//!
//! - **types**: ids, profiles, memes, candidates, swipe decisions, counters,
//!   match and chat records, and the explicit acting-user `Session`
//!
//! ## Example Usage
//!
//! ```ignore
//! use model::{Candidate, Counters, SwipeDirection, UserSummary};
//!
//! let candidate = Candidate::new(UserSummary::new(7, "MemeKing"), vec![]);
//! assert!(!candidate.is_draggable());
//!
//! let mut counters = Counters::default();
//! counters.record(SwipeDirection::Right);
//! ```

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    // Type aliases
    CommentId,
    MatchId,
    MediaId,
    MessageId,
    UserId,
    // Core types
    Candidate,
    ChatMessage,
    Comment,
    Counters,
    LikeOutcome,
    Match,
    MatchEvent,
    MediaItem,
    MediaRef,
    Session,
    SwipeDecision,
    UserSummary,
    // Enums
    SwipeDirection,
};
