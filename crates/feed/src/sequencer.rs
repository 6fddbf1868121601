//! # Feed Sequencer
//!
//! Owns the candidate queue, the current/preview pointer and the session
//! counters, and turns swipe decisions into backend commands.
//!
//! ## State machine
//! ```text
//! Idle ──begin_load──▶ Loading ──complete_load──▶ Ready | Exhausted | Failed
//! Ready ──last decision──▶ Loading
//! Failed | Exhausted ──retry──▶ Loading
//! any ──begin_load──▶ Loading
//! ```
//!
//! ## Design Note
//! The sequencer does no I/O. It returns `FeedCommand`s and the caller runs
//! them. Decisions are applied locally before any command is executed and are
//! never rolled back, whatever the backend later says.
//!
//! Every load is tagged with a generation. A completion for an older
//! generation is ignored, so a reload requested while a load is in flight
//! wins over the earlier request.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use model::{Candidate, Counters, SwipeDecision, UserId};

use crate::error::FeedError;

/// Where the feed is in its lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    /// At least one candidate in the queue
    Ready,
    /// The last load returned no candidates
    Exhausted,
    /// The last load failed; `retry` starts a new one
    Failed { message: String },
}

impl FeedStatus {
    pub fn name(&self) -> &'static str {
        match self {
            FeedStatus::Idle => "idle",
            FeedStatus::Loading => "loading",
            FeedStatus::Ready => "ready",
            FeedStatus::Exhausted => "exhausted",
            FeedStatus::Failed { .. } => "failed",
        }
    }
}

/// Work the caller must perform on the sequencer's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum FeedCommand {
    /// Load a new batch and report it back with `complete_load(generation, ..)`
    Fetch { generation: u64 },
    /// Submit a like; a mutual like becomes a match event
    SubmitLike { candidate: Candidate },
    SubmitReject { target: UserId },
}

/// The feed queue state machine.
#[derive(Debug, Default)]
pub struct FeedSequencer {
    status: FeedStatus,
    queue: VecDeque<Candidate>,
    counters: Counters,
    generation: u64,
}

impl FeedSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    /// Generation of the most recent load request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// The candidate decisions apply to
    pub fn current(&self) -> Option<&Candidate> {
        self.queue.front()
    }

    /// The candidate after the current one
    pub fn preview(&self) -> Option<&Candidate> {
        self.queue.get(1)
    }

    /// Candidates left in the queue, the current one included
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Drop the queue and request a fresh batch.
    ///
    /// Counters are kept.
    pub fn begin_load(&mut self) -> FeedCommand {
        self.queue.clear();
        self.generation += 1;
        self.status = FeedStatus::Loading;
        info!("Requesting feed batch (generation {})", self.generation);
        FeedCommand::Fetch {
            generation: self.generation,
        }
    }

    /// Report the result of a `Fetch`.
    ///
    /// Returns `false` when the completion was stale and ignored.
    pub fn complete_load(
        &mut self,
        generation: u64,
        result: Result<Vec<Candidate>, String>,
    ) -> bool {
        if generation != self.generation || self.status != FeedStatus::Loading {
            debug!(
                "Ignoring stale feed load (generation {}, current {})",
                generation, self.generation
            );
            return false;
        }

        match result {
            Ok(batch) if batch.is_empty() => {
                info!("Feed batch {} is empty", generation);
                self.status = FeedStatus::Exhausted;
            }
            Ok(batch) => {
                info!("Feed batch {} ready with {} candidates", generation, batch.len());
                self.queue = batch.into();
                self.status = FeedStatus::Ready;
            }
            Err(message) => {
                warn!("Feed batch {} failed: {}", generation, message);
                self.status = FeedStatus::Failed { message };
            }
        }
        true
    }

    /// Start a new load after a failure or an empty batch.
    pub fn retry(&mut self) -> Option<FeedCommand> {
        match self.status {
            FeedStatus::Failed { .. } | FeedStatus::Exhausted => Some(self.begin_load()),
            _ => None,
        }
    }

    /// Apply a committed decision to the current candidate.
    ///
    /// The counter is bumped and the candidate removed before any command is
    /// returned. When the queue drains, a `Fetch` for the next batch is the
    /// last command.
    pub fn apply(&mut self, decision: SwipeDecision) -> Result<Vec<FeedCommand>, FeedError> {
        if self.status != FeedStatus::Ready {
            return Err(FeedError::NotReady(self.status.name()));
        }
        let expected = self.queue.front().map(Candidate::id);
        if expected != Some(decision.candidate) {
            return Err(FeedError::NotCurrent {
                expected: expected.unwrap_or_default(),
                got: decision.candidate,
            });
        }
        let Some(candidate) = self.queue.pop_front() else {
            return Err(FeedError::NotReady(self.status.name()));
        };

        self.counters.record(decision.direction);
        debug!(
            "Decided {:?} on user {} ({} left)",
            decision.direction,
            candidate.id(),
            self.queue.len()
        );

        let mut commands = Vec::with_capacity(2);
        if decision.direction.is_like() {
            commands.push(FeedCommand::SubmitLike { candidate });
        } else {
            commands.push(FeedCommand::SubmitReject {
                target: candidate.id(),
            });
        }

        if self.queue.is_empty() {
            commands.push(self.begin_load());
        }
        Ok(commands)
    }
}
