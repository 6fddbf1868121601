//! Swipe Commit Engine
//!
//! Owns the card currently on top of the feed and decides, on release,
//! whether a drag becomes a swipe.
//!
//! ## Algorithm
//! 1. `pointer_down` starts a `DragSession` for the attached card
//! 2. `pointer_up` compares `|offset.x|` against the swipe threshold
//!    - at or above: the card flies to `±fly_off_distance` over the settle
//!      duration, and `poll` emits the decision once that deadline passes
//!    - below: the card returns to the origin over the same duration
//! 3. `press` (the like/reject buttons) skips tracking and decides at once
//!
//! A card is decided at most once: emitting a decision detaches it, and the
//! caller attaches the next candidate. The engine never reads a clock itself;
//! callers pass `Instant`s in and wake it at `next_deadline()`.

use std::time::Instant;

use model::{SwipeDecision, SwipeDirection, UserId};
use tracing::debug;

use crate::tracker::{opacity_for, rotation_for, DragIntent, DragSession, GestureConfig, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttachedCard {
    candidate: UserId,
    draggable: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Dragging(DragSession),
    FlyingOff {
        direction: SwipeDirection,
        offset: Point,
        until: Instant,
    },
    Returning {
        until: Instant,
    },
}

/// What happened when the pointer was released
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// The swipe took; the decision is emitted by `poll` at `settles_at`
    Committed {
        direction: SwipeDirection,
        settles_at: Instant,
    },
    /// Below threshold; the card is animating back to the origin
    Returned,
    /// No drag was in progress
    Ignored,
}

/// Everything a renderer needs to draw the top card.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CardVisual {
    pub offset: Point,
    pub rotation: f64,
    pub opacity: f64,
    pub intent: DragIntent,
    /// Overlay label to draw (LIKE for right, NOPE for left)
    pub label: Option<SwipeDirection>,
    /// Whether position changes should animate (false while following the pointer)
    pub animated: bool,
}

/// Turns pointer input and button presses on the top card into swipe decisions.
pub struct SwipeCommitEngine {
    config: GestureConfig,
    card: Option<AttachedCard>,
    phase: Phase,
}

impl SwipeCommitEngine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            card: None,
            phase: Phase::Idle,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Put a candidate on top. Re-attaching the same candidate is a no-op.
    pub fn attach(&mut self, candidate: UserId, draggable: bool) {
        let card = AttachedCard {
            candidate,
            draggable,
        };
        if self.card == Some(card) {
            return;
        }
        self.card = Some(card);
        self.phase = Phase::Idle;
    }

    /// Remove the top card (feed loading, failed or exhausted)
    pub fn detach(&mut self) {
        self.card = None;
        self.phase = Phase::Idle;
    }

    pub fn attached(&self) -> Option<UserId> {
        self.card.map(|c| c.candidate)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    pub fn is_flying_off(&self) -> bool {
        matches!(self.phase, Phase::FlyingOff { .. })
    }

    /// Begin a drag. Returns false when there is nothing draggable on top or
    /// a committed card is still leaving the screen.
    pub fn pointer_down(&mut self, position: Point) -> bool {
        let draggable = self.card.map(|c| c.draggable).unwrap_or(false);
        if !draggable {
            return false;
        }
        match self.phase {
            Phase::Idle | Phase::Returning { .. } => {
                self.phase = Phase::Dragging(DragSession::begin(position));
                true
            }
            Phase::Dragging(_) | Phase::FlyingOff { .. } => false,
        }
    }

    pub fn pointer_move(&mut self, position: Point) -> Option<DragIntent> {
        match &mut self.phase {
            Phase::Dragging(drag) => Some(drag.update(position, &self.config)),
            _ => None,
        }
    }

    pub fn pointer_up(&mut self, now: Instant) -> ReleaseOutcome {
        let drag = match &self.phase {
            Phase::Dragging(drag) => drag.clone(),
            _ => return ReleaseOutcome::Ignored,
        };

        let offset = drag.offset();
        let until = now + self.config.settle();

        if offset.x.abs() >= self.config.swipe_threshold {
            let direction = SwipeDirection::from_offset(offset.x);
            debug!(
                "Swipe committed {:?} at dx={:.1} (threshold {:.1})",
                direction, offset.x, self.config.swipe_threshold
            );
            self.phase = Phase::FlyingOff {
                direction,
                offset: Point::new(direction.sign() * self.config.fly_off_distance, offset.y),
                until,
            };
            ReleaseOutcome::Committed {
                direction,
                settles_at: until,
            }
        } else {
            self.phase = Phase::Returning { until };
            ReleaseOutcome::Returned
        }
    }

    /// Abandon the current drag as if released below threshold
    pub fn pointer_cancel(&mut self, now: Instant) {
        if self.is_dragging() {
            self.phase = Phase::Returning {
                until: now + self.config.settle(),
            };
        }
    }

    /// Like/reject button: decide immediately without gesture tracking.
    pub fn press(&mut self, direction: SwipeDirection) -> Option<SwipeDecision> {
        if self.is_flying_off() {
            return None;
        }
        let card = self.card.take()?;
        self.phase = Phase::Idle;
        debug!("Button {:?} on candidate {}", direction, card.candidate);
        Some(SwipeDecision::new(card.candidate, direction))
    }

    /// Advance timed transitions. Emits the decision once a fly-off settles.
    pub fn poll(&mut self, now: Instant) -> Option<SwipeDecision> {
        match self.phase {
            Phase::FlyingOff {
                direction, until, ..
            } if now >= until => {
                self.phase = Phase::Idle;
                let card = self.card.take()?;
                Some(SwipeDecision::new(card.candidate, direction))
            }
            Phase::Returning { until } if now >= until => {
                self.phase = Phase::Idle;
                None
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::FlyingOff { until, .. } | Phase::Returning { until } => Some(until),
            _ => None,
        }
    }

    /// Drop all state, including any pending fly-off (teardown)
    pub fn reset(&mut self) {
        self.detach();
    }

    pub fn visual(&self) -> CardVisual {
        match &self.phase {
            Phase::Dragging(drag) => {
                let label = if drag.shows_label(&self.config) {
                    match drag.intent() {
                        DragIntent::Right => Some(SwipeDirection::Right),
                        DragIntent::Left => Some(SwipeDirection::Left),
                        DragIntent::None => None,
                    }
                } else {
                    None
                };
                CardVisual {
                    offset: drag.offset(),
                    rotation: drag.rotation(&self.config),
                    opacity: drag.opacity(&self.config),
                    intent: drag.intent(),
                    label,
                    animated: false,
                }
            }
            Phase::FlyingOff {
                direction, offset, ..
            } => CardVisual {
                offset: *offset,
                rotation: rotation_for(offset.x, &self.config),
                opacity: opacity_for(offset.x, &self.config),
                intent: match direction {
                    SwipeDirection::Right => DragIntent::Right,
                    SwipeDirection::Left => DragIntent::Left,
                },
                label: Some(*direction),
                animated: true,
            },
            Phase::Idle | Phase::Returning { .. } => CardVisual {
                opacity: 1.0,
                animated: true,
                ..CardVisual::default()
            },
        }
    }
}
