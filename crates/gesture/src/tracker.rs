//! Gesture Tracker
//!
//! Turns raw pointer/touch positions into a drag offset, the derived card
//! rotation and opacity, and a left/right intent used by the overlay label.
//!
//! ## Algorithm
//! 1. On pointer-down, remember the origin
//! 2. On every move, `offset = position - origin`
//! 3. Classify intent with a dead zone around zero so small jitters never
//!    flip the overlay
//! 4. Derive rotation and opacity from the horizontal offset
//!
//! Everything here is synchronous and allocation-free; it runs once per input
//! event.

use serde::{Deserialize, Serialize};

/// A pointer position or offset in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn delta_from(self, origin: Point) -> Point {
        Point {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// Tunables for drag tracking and commit.
///
/// Defaults reproduce the card feel of the web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Horizontal distance before an intent is shown (px)
    pub dead_zone: f64,
    /// Horizontal distance at which the LIKE/NOPE label appears (px)
    pub label_distance: f64,
    /// Horizontal distance at release that commits the swipe (px)
    pub swipe_threshold: f64,
    /// Degrees of rotation per pixel of horizontal offset
    pub rotation_factor: f64,
    /// Horizontal distance over which the card fades out completely (px)
    pub fade_distance: f64,
    /// Upper bound on the faded fraction; 1.0 lets the card reach opacity 0
    pub max_fade: f64,
    /// Where a committed card is sent, in absolute px from the center
    pub fly_off_distance: f64,
    /// Duration of the fly-off and snap-back transitions
    pub settle_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dead_zone: 20.0,
            label_distance: 30.0,
            swipe_threshold: 100.0,
            rotation_factor: 0.1,
            fade_distance: 500.0,
            max_fade: 1.0,
            fly_off_distance: 1000.0,
            settle_ms: 300,
        }
    }
}

impl GestureConfig {
    pub fn settle(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_ms)
    }
}

/// Which way the user currently appears to be swiping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragIntent {
    #[default]
    None,
    Left,
    Right,
}

/// Classify a horizontal offset against the dead zone.
///
/// The boundaries themselves are inside the dead zone: exactly ±`dead_zone`
/// is still `None`.
pub fn classify(dx: f64, dead_zone: f64) -> DragIntent {
    if dx > dead_zone {
        DragIntent::Right
    } else if dx < -dead_zone {
        DragIntent::Left
    } else {
        DragIntent::None
    }
}

/// Card rotation in degrees for a horizontal offset
pub fn rotation_for(dx: f64, config: &GestureConfig) -> f64 {
    dx * config.rotation_factor
}

/// Card opacity for a horizontal offset, clamped to `[1 - max_fade, 1]`
pub fn opacity_for(dx: f64, config: &GestureConfig) -> f64 {
    let fade = (dx.abs() / config.fade_distance).min(config.max_fade);
    1.0 - fade
}

/// Transient per-gesture state, alive from pointer-down to release.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    origin: Point,
    offset: Point,
    intent: DragIntent,
}

impl DragSession {
    /// Start tracking at the pointer-down position
    pub fn begin(origin: Point) -> Self {
        Self {
            origin,
            offset: Point::ORIGIN,
            intent: DragIntent::None,
        }
    }

    /// Feed a new pointer position and return the updated intent
    pub fn update(&mut self, position: Point, config: &GestureConfig) -> DragIntent {
        self.offset = position.delta_from(self.origin);
        self.intent = classify(self.offset.x, config.dead_zone);
        self.intent
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn intent(&self) -> DragIntent {
        self.intent
    }

    pub fn rotation(&self, config: &GestureConfig) -> f64 {
        rotation_for(self.offset.x, config)
    }

    pub fn opacity(&self, config: &GestureConfig) -> f64 {
        opacity_for(self.offset.x, config)
    }

    /// Whether the LIKE/NOPE overlay should be drawn
    pub fn shows_label(&self, config: &GestureConfig) -> bool {
        self.intent != DragIntent::None && self.offset.x.abs() > config.label_distance
    }
}
