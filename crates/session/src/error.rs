//! Error types for the session crate.

use std::path::PathBuf;

use api_client::ApiError;
use model::{MatchId, UserId};
use thiserror::Error;

/// Errors that can occur while loading client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by the chat room
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("User {user_id} is not part of match {match_id}")]
    NotParticipant { match_id: MatchId, user_id: UserId },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The swipe session event loop is no longer running
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Swipe session has shut down")]
pub struct SessionClosed;
