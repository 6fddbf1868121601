//! # Feed Crate
//!
//! Everything between "the backend has profiles" and "this is the card on
//! screen".
//!
//! ## Main Components
//!
//! - **FeedSequencer**: the queue state machine (load, decide, reload)
//! - **FeedLoader**: fetches, filters and enriches one batch
//! - **FilterPipeline**: composable profile filters
//! - **enrich**: concurrent meme/like/comment resolution with per-item
//!   degradation
//! - **ProfileView**: one user's memes, with meme likes and comments
//!
//! ## Example Usage
//!
//! ```ignore
//! use feed::{FeedCommand, FeedLoader, FeedSequencer};
//!
//! let loader = FeedLoader::new(backend, session);
//! let mut feed = FeedSequencer::new();
//!
//! if let FeedCommand::Fetch { generation } = feed.begin_load() {
//!     let batch = loader.load().await.map_err(|e| format!("{:#}", e));
//!     feed.complete_load(generation, batch);
//! }
//! ```

pub mod context;
pub mod enrich;
pub mod error;
pub mod filter_pipeline;
pub mod filters;
pub mod loader;
pub mod profile;
pub mod sequencer;
pub mod traits;

// Re-export commonly used types
pub use context::FeedContext;
pub use error::{FeedError, ProfileError};
pub use filter_pipeline::FilterPipeline;
pub use loader::FeedLoader;
pub use profile::{ProfileStats, ProfileView};
pub use sequencer::{FeedCommand, FeedSequencer, FeedStatus};
pub use traits::ProfileFilter;
