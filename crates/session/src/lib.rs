//! # Session Crate
//!
//! The running client: everything that involves time or more than one
//! component at once.
//!
//! ## Main Components
//!
//! - **SwipeSession**: the swipe screen event loop (gesture, feed, backend
//!   calls and match overlays on one task)
//! - **MatchNotifier**: heart burst and match celebration timing
//! - **ChatRoom**: per-match message list with interval polling
//! - **ClientConfig**: base URL, gesture constants and overlay timings

pub mod chat;
pub mod config;
pub mod driver;
pub mod error;
pub mod match_notifier;

pub use chat::ChatRoom;
pub use config::{ClientConfig, Timings, API_URL_ENV};
pub use driver::{FeedView, SessionHandle, SwipeSession, UiEvent};
pub use error::{ChatError, ConfigError, SessionClosed};
pub use match_notifier::{MatchNotifier, NotifierSignal};
