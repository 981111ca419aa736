//! Input sample types for the gesture engine.
//!
//! A [`Sample`] is one observation from the platform input layer: a pointer
//! position, a timestamp, and whether the sample is a press edge, a release
//! edge, or plain movement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 2D point in input space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Length of this point interpreted as a vector.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Vector from `self` to `other`.
    pub fn to(&self, other: &Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    /// Point at fraction `t` of the way from `self` to `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Edge classification of a sample.
///
/// A sample is either a press, a release, or neither; never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Pointer moved or key state unchanged
    #[default]
    Move,
    /// Press edge (pointer down or key down)
    Down,
    /// Release edge (pointer up or key up)
    Up,
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Identifies the key or button a sample refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// Printable keyboard key
    Char(char),
    /// Platform key code (modifiers, function keys, ...)
    Code(u32),
    /// Pointer button
    Mouse(MouseButton),
}

impl Key {
    /// Whether this key is a pointer button rather than a keyboard key.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Key::Mouse(_))
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Code(code) => write!(f, "#{code}"),
            Key::Mouse(button) => write!(f, "mouse:{button:?}"),
        }
    }
}

/// One input observation. Immutable once appended to the buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Pointer position at the time of the sample
    #[serde(flatten)]
    pub position: Point,
    /// When the sample was taken
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    /// Press/release classification
    #[serde(default)]
    pub phase: Phase,
    /// Key or button this sample refers to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
}

impl Sample {
    /// Pointer movement sample.
    pub fn moved(position: Point, timestamp: DateTime<Utc>) -> Self {
        Self {
            position,
            timestamp,
            phase: Phase::Move,
            key: None,
        }
    }

    /// Pointer press sample.
    pub fn down(position: Point, timestamp: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Down,
            ..Self::moved(position, timestamp)
        }
    }

    /// Pointer release sample.
    pub fn up(position: Point, timestamp: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Up,
            ..Self::moved(position, timestamp)
        }
    }

    /// Key press edge. Position is left at the origin.
    pub fn key_down(key: Key, timestamp: DateTime<Utc>) -> Self {
        Self {
            key: Some(key),
            ..Self::down(Point::default(), timestamp)
        }
    }

    /// Key release edge.
    pub fn key_up(key: Key, timestamp: DateTime<Utc>) -> Self {
        Self {
            key: Some(key),
            ..Self::up(Point::default(), timestamp)
        }
    }

    pub fn is_down(&self) -> bool {
        self.phase == Phase::Down
    }

    pub fn is_up(&self) -> bool {
        self.phase == Phase::Up
    }

    /// Pointer samples drive swipe and shape gestures; keyboard samples do not.
    pub fn is_pointer(&self) -> bool {
        self.key.map_or(true, |k| k.is_pointer())
    }
}
