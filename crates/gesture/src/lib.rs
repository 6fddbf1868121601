//! # Gesture Crate
//!
//! Pointer tracking and swipe commit logic for the top card of the feed.
//!
//! ## Components
//!
//! ### Gesture Tracker
//! Converts pointer positions into an offset, rotation, opacity and a
//! left/right intent (with a dead zone so jitter never flips the overlay).
//!
//! ### Swipe Commit Engine
//! Decides on release whether the drag crossed the swipe threshold, animates
//! the fly-off or the snap-back, and emits exactly one `SwipeDecision` per
//! committed card. Like/reject buttons go through the same engine.
//!
//! ## Example Usage
//!
//! ```ignore
//! use gesture::{GestureConfig, Point, SwipeCommitEngine};
//! use std::time::Instant;
//!
//! let mut engine = SwipeCommitEngine::new(GestureConfig::default());
//! engine.attach(candidate_id, true);
//! engine.pointer_down(Point::new(0.0, 0.0));
//! engine.pointer_move(Point::new(180.0, 4.0));
//! engine.pointer_up(Instant::now());
//!
//! // later, at engine.next_deadline()
//! if let Some(decision) = engine.poll(Instant::now()) {
//!     feed.apply(decision)?;
//! }
//! ```

pub mod commit;
pub mod tracker;

pub use commit::{CardVisual, ReleaseOutcome, SwipeCommitEngine};
pub use tracker::{classify, opacity_for, rotation_for, DragIntent, DragSession, GestureConfig, Point};
