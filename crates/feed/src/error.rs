//! Error types for the feed crate.

use api_client::ApiError;
use model::{MediaId, UserId};
use thiserror::Error;

/// Why a swipe decision was refused by the sequencer.
///
/// A refused decision leaves the queue and the counters untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Feed is not ready for decisions (status: {0})")]
    NotReady(&'static str),

    #[error("Decision for user {got} but the current candidate is {expected}")]
    NotCurrent { expected: UserId, got: UserId },
}

/// Errors from acting on a profile view
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Comment is empty")]
    EmptyComment,

    #[error("Meme {0} is not on this profile")]
    UnknownMedia(MediaId),

    #[error(transparent)]
    Api(#[from] ApiError),
}
