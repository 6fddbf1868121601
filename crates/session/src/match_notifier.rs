//! # Match Notifier
//!
//! Timed overlays that follow a like:
//! - the heart burst, shown for a moment after every committed like
//! - the match celebration, revealed a moment after the backend reports a
//!   mutual like and kept up until tapped away or timed out
//!
//! ## Algorithm
//! ```text
//! Idle ──on_match──▶ Pending ──reveal deadline──▶ Showing ──tap | timeout──▶ Idle
//! ```
//! Matches arriving while one is pending or showing wait in a FIFO queue and
//! are revealed one after another. When the last one is dismissed the
//! notifier asks for a feed reload.
//!
//! Like the commit engine this is clock-agnostic: the caller passes `Instant`s
//! and wakes it at `next_deadline()`. Dropping every deadline is therefore a
//! plain state reset (`cancel_all`).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use model::{MatchEvent, MatchId};
use tracing::{debug, info};

use crate::config::Timings;

/// Something the driver must react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierSignal {
    CelebrationShown { match_id: Option<MatchId> },
    /// The celebration went away; `reload` is set when no other match is queued
    Dismissed { reload: bool },
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Idle,
    Pending { event: MatchEvent, reveal_at: Instant },
    Showing { event: MatchEvent, dismiss_at: Instant },
}

pub struct MatchNotifier {
    like_burst: Duration,
    reveal_delay: Duration,
    celebration: Duration,
    burst_until: Option<Instant>,
    stage: Stage,
    queued: VecDeque<MatchEvent>,
}

impl MatchNotifier {
    pub fn new(timings: &Timings) -> Self {
        Self {
            like_burst: timings.like_burst(),
            reveal_delay: timings.match_reveal(),
            celebration: timings.celebration(),
            burst_until: None,
            stage: Stage::Idle,
            queued: VecDeque::new(),
        }
    }

    /// A like was committed locally: show the heart burst
    pub fn like_committed(&mut self, now: Instant) {
        self.burst_until = Some(now + self.like_burst);
    }

    pub fn like_burst_visible(&self, now: Instant) -> bool {
        self.burst_until.is_some_and(|until| now < until)
    }

    /// The backend reported a mutual like.
    pub fn on_match(&mut self, event: MatchEvent, now: Instant) {
        match self.stage {
            Stage::Idle => {
                debug!("Match with user {} pending reveal", event.candidate.id());
                self.stage = Stage::Pending {
                    event,
                    reveal_at: now + self.reveal_delay,
                };
            }
            _ => {
                debug!(
                    "Match with user {} queued behind the current one",
                    event.candidate.id()
                );
                self.queued.push_back(event);
            }
        }
    }

    /// The match currently on screen
    pub fn celebration(&self) -> Option<&MatchEvent> {
        match &self.stage {
            Stage::Showing { event, .. } => Some(event),
            _ => None,
        }
    }

    pub fn is_celebrating(&self) -> bool {
        matches!(self.stage, Stage::Showing { .. })
    }

    /// Matches waiting to be shown, the pending one included
    pub fn backlog(&self) -> usize {
        let pending = usize::from(matches!(self.stage, Stage::Pending { .. }));
        pending + self.queued.len()
    }

    /// Tap on the celebration overlay. Ignored when nothing is on screen.
    pub fn tap(&mut self, now: Instant) -> Option<NotifierSignal> {
        if self.is_celebrating() {
            Some(self.dismiss(now))
        } else {
            None
        }
    }

    /// Advance every deadline that has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<NotifierSignal> {
        if self.burst_until.is_some_and(|until| now >= until) {
            self.burst_until = None;
        }

        let mut signals = Vec::new();
        loop {
            match &self.stage {
                Stage::Pending { reveal_at, .. } if now >= *reveal_at => {
                    let Stage::Pending { event, .. } =
                        std::mem::replace(&mut self.stage, Stage::Idle)
                    else {
                        break;
                    };
                    info!("It's a match with {}!", event.candidate.profile.name);
                    signals.push(NotifierSignal::CelebrationShown {
                        match_id: event.match_id,
                    });
                    self.stage = Stage::Showing {
                        event,
                        dismiss_at: now + self.celebration,
                    };
                }
                Stage::Showing { dismiss_at, .. } if now >= *dismiss_at => {
                    signals.push(self.dismiss(now));
                }
                _ => break,
            }
        }
        signals
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let stage = match &self.stage {
            Stage::Idle => None,
            Stage::Pending { reveal_at, .. } => Some(*reveal_at),
            Stage::Showing { dismiss_at, .. } => Some(*dismiss_at),
        };
        match (self.burst_until, stage) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop every pending overlay and queued match (teardown)
    pub fn cancel_all(&mut self) {
        self.burst_until = None;
        self.stage = Stage::Idle;
        self.queued.clear();
    }

    fn dismiss(&mut self, now: Instant) -> NotifierSignal {
        match self.queued.pop_front() {
            Some(next) => {
                self.stage = Stage::Pending {
                    event: next,
                    reveal_at: now + self.reveal_delay,
                };
                NotifierSignal::Dismissed { reload: false }
            }
            None => {
                self.stage = Stage::Idle;
                NotifierSignal::Dismissed { reload: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Candidate, UserSummary};

    fn event(id: u64) -> MatchEvent {
        MatchEvent {
            candidate: Candidate::new(UserSummary::new(id, format!("user{}", id)), vec![]),
            match_id: Some(id * 10),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn notifier() -> MatchNotifier {
        MatchNotifier::new(&Timings::default())
    }

    #[test]
    fn test_like_burst_lasts_800ms() {
        let t0 = Instant::now();
        let mut n = notifier();

        n.like_committed(t0);

        assert!(n.like_burst_visible(t0 + ms(799)));
        assert_eq!(n.next_deadline(), Some(t0 + ms(800)));
        assert!(n.poll(t0 + ms(800)).is_empty());
        assert!(!n.like_burst_visible(t0 + ms(800)));
        assert_eq!(n.next_deadline(), None);
    }

    #[test]
    fn test_celebration_revealed_after_delay() {
        let t0 = Instant::now();
        let mut n = notifier();

        n.on_match(event(1), t0);

        assert!(n.poll(t0 + ms(799)).is_empty());
        assert!(n.celebration().is_none());

        let signals = n.poll(t0 + ms(800));
        assert_eq!(
            signals,
            vec![NotifierSignal::CelebrationShown { match_id: Some(10) }]
        );
        assert_eq!(n.celebration().map(|e| e.candidate.id()), Some(1));
    }

    #[test]
    fn test_timeout_dismisses_and_reloads() {
        let t0 = Instant::now();
        let mut n = notifier();
        n.on_match(event(1), t0);
        n.poll(t0 + ms(800));

        assert!(n.poll(t0 + ms(3799)).is_empty());
        let signals = n.poll(t0 + ms(3800));

        assert_eq!(signals, vec![NotifierSignal::Dismissed { reload: true }]);
        assert!(!n.is_celebrating());
        assert_eq!(n.next_deadline(), None);
    }

    #[test]
    fn test_tap_and_timeout_reach_same_state() {
        let t0 = Instant::now();

        let mut tapped = notifier();
        tapped.on_match(event(1), t0);
        tapped.poll(t0 + ms(800));
        let tap_signal = tapped.tap(t0 + ms(1500));

        let mut timed = notifier();
        timed.on_match(event(1), t0);
        timed.poll(t0 + ms(800));
        let timeout_signals = timed.poll(t0 + ms(3800));

        assert_eq!(tap_signal, Some(NotifierSignal::Dismissed { reload: true }));
        assert_eq!(timeout_signals, vec![NotifierSignal::Dismissed { reload: true }]);
        assert_eq!(tapped.stage, timed.stage);
        assert_eq!(tapped.backlog(), timed.backlog());
        assert_eq!(tapped.next_deadline(), timed.next_deadline());
    }

    #[test]
    fn test_tap_without_celebration_ignored() {
        let t0 = Instant::now();
        let mut n = notifier();
        n.on_match(event(1), t0);

        assert_eq!(n.tap(t0 + ms(100)), None, "Pending match is not on screen yet");
        assert_eq!(n.backlog(), 1);
    }

    #[test]
    fn test_queued_matches_never_overlap() {
        let t0 = Instant::now();
        let mut n = notifier();
        n.on_match(event(1), t0);
        n.on_match(event(2), t0 + ms(100));
        assert_eq!(n.backlog(), 2);

        n.poll(t0 + ms(800));
        assert_eq!(n.celebration().map(|e| e.candidate.id()), Some(1));

        let signal = n.tap(t0 + ms(1000));
        assert_eq!(signal, Some(NotifierSignal::Dismissed { reload: false }));
        assert!(n.celebration().is_none(), "Next match waits for its own reveal");

        n.poll(t0 + ms(1800));
        assert_eq!(n.celebration().map(|e| e.candidate.id()), Some(2));
        assert_eq!(n.tap(t0 + ms(1900)), Some(NotifierSignal::Dismissed { reload: true }));
    }

    #[test]
    fn test_late_poll_catches_up() {
        let t0 = Instant::now();
        let mut n = notifier();
        n.on_match(event(1), t0);

        let signals = n.poll(t0 + ms(10_000));

        assert_eq!(signals.len(), 1, "Celebration timeout counts from when it was shown");
        assert!(n.is_celebrating());
    }

    #[test]
    fn test_cancel_all_drops_deadlines() {
        let t0 = Instant::now();
        let mut n = notifier();
        n.like_committed(t0);
        n.on_match(event(1), t0);
        n.on_match(event(2), t0);

        n.cancel_all();

        assert_eq!(n.next_deadline(), None);
        assert!(n.poll(t0 + ms(60_000)).is_empty());
        assert_eq!(n.backlog(), 0);
    }
}
