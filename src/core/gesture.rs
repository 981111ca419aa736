//! Gesture definitions.
//!
//! A definition pairs an identifier and a time window with one of three
//! matching strategies: an ordered key combo, a directional swipe, or a
//! free-form shape compared against a template stroke.

use crate::dispatch::MatchEvent;
use crate::input::types::{Key, Point};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Gesture identifier, unique within a registry.
pub type GestureId = String;

/// Default time window for a gesture.
pub const DEFAULT_TIME_WINDOW: Duration = Duration::from_millis(1000);

/// Synchronous match callback.
pub type MatchCallback = Arc<dyn Fn(&MatchEvent) + Send + Sync>;

/// Which edge of a key a combo step waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Down,
    Up,
}

/// One step of a key combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComboStep {
    pub key: Key,
    pub edge: Edge,
}

impl ComboStep {
    pub fn down(key: Key) -> Self {
        Self {
            key,
            edge: Edge::Down,
        }
    }

    pub fn up(key: Key) -> Self {
        Self { key, edge: Edge::Up }
    }
}

/// Parameters of a directional swipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeSpec {
    /// Minimum displacement; a displacement equal to this does not match
    pub dead_zone: f64,
    /// Reference direction (need not be unit length)
    pub direction: Point,
    /// Maximum deviation from `direction`, in degrees (exclusive)
    pub angle_threshold: f64,
}

/// Parameters of a shape gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    /// Template stroke, at least two points
    pub template: Vec<Point>,
    /// Scores strictly below this match
    pub threshold: f64,
}

/// Matching strategy and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GestureKind {
    Combo { steps: Vec<ComboStep> },
    Swipe(SwipeSpec),
    Shape(ShapeSpec),
}

impl GestureKind {
    pub fn tag(&self) -> KindTag {
        match self {
            GestureKind::Combo { .. } => KindTag::Combo,
            GestureKind::Swipe(_) => KindTag::Swipe,
            GestureKind::Shape(_) => KindTag::Shape,
        }
    }
}

/// Kind discriminant without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindTag {
    Combo,
    Swipe,
    Shape,
}

impl std::fmt::Display for KindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KindTag::Combo => write!(f, "combo"),
            KindTag::Swipe => write!(f, "swipe"),
            KindTag::Shape => write!(f, "shape"),
        }
    }
}

/// Whether a gesture stays armed after matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireMode {
    /// Fire on every new match
    #[default]
    Repeat,
    /// Fire once, then unregister
    Once,
}

/// A registered gesture.
#[derive(Clone, Serialize, Deserialize)]
pub struct GestureDefinition {
    pub id: GestureId,
    /// Longest span a matching sequence may cover (seconds on disk)
    #[serde(with = "secs_f64", default = "default_time_window")]
    pub time_window: Duration,
    #[serde(default)]
    pub fire: FireMode,
    pub kind: GestureKind,
    #[serde(skip)]
    pub callback: Option<MatchCallback>,
}

fn default_time_window() -> Duration {
    DEFAULT_TIME_WINDOW
}

impl GestureDefinition {
    pub fn new(id: impl Into<GestureId>, kind: GestureKind) -> Self {
        Self {
            id: id.into(),
            time_window: DEFAULT_TIME_WINDOW,
            fire: FireMode::Repeat,
            kind,
            callback: None,
        }
    }

    /// Ordered key combo.
    pub fn combo(id: impl Into<GestureId>, steps: Vec<ComboStep>) -> Self {
        Self::new(id, GestureKind::Combo { steps })
    }

    /// Swipe along `direction` farther than `dead_zone`, within
    /// `angle_threshold` degrees.
    pub fn swipe(
        id: impl Into<GestureId>,
        direction: Point,
        dead_zone: f64,
        angle_threshold: f64,
    ) -> Self {
        Self::new(
            id,
            GestureKind::Swipe(SwipeSpec {
                dead_zone,
                direction,
                angle_threshold,
            }),
        )
    }

    /// Free-form stroke matched against `template`.
    pub fn shape(id: impl Into<GestureId>, template: Vec<Point>, threshold: f64) -> Self {
        Self::new(
            id,
            GestureKind::Shape(ShapeSpec {
                template,
                threshold,
            }),
        )
    }

    pub fn with_time_window(mut self, window: Duration) -> Self {
        self.time_window = window;
        self
    }

    /// Fire only once, then unregister.
    pub fn once(mut self) -> Self {
        self.fire = FireMode::Once;
        self
    }

    pub fn on_match<F>(mut self, callback: F) -> Self
    where
        F: Fn(&MatchEvent) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }
}

impl std::fmt::Debug for GestureDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureDefinition")
            .field("id", &self.id)
            .field("time_window", &self.time_window)
            .field("fire", &self.fire)
            .field("kind", &self.kind)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Serde support for Duration as fractional seconds.
mod secs_f64 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let swipe = GestureDefinition::swipe("right", Point::new(1.0, 0.0), 50.0, 30.0)
            .with_time_window(Duration::from_millis(400))
            .once();
        assert_eq!(swipe.tag(), KindTag::Swipe);
        assert_eq!(swipe.fire, FireMode::Once);
        assert_eq!(swipe.time_window, Duration::from_millis(400));
        assert!(swipe.callback.is_none());

        let combo = GestureDefinition::combo("save", vec![ComboStep::down(Key::Code(17))])
            .on_match(|_| {});
        assert!(combo.callback.is_some());
        assert_eq!(combo.fire, FireMode::Repeat);
    }

    #[test]
    fn test_definition_from_json() {
        let json = r#"[
            {"id": "swipe-up", "time_window": 0.5,
             "kind": {"type": "swipe", "dead_zone": 40, "direction": {"x": 0, "y": -1}, "angle_threshold": 25}},
            {"id": "copy", "fire": "once",
             "kind": {"type": "combo", "steps": [
                {"key": {"code": 17}, "edge": "down"},
                {"key": {"char": "c"}, "edge": "down"}]}},
            {"id": "vee",
             "kind": {"type": "shape", "template": [{"x": 0, "y": 0}, {"x": 1, "y": 2}, {"x": 2, "y": 0}], "threshold": 0.12}}
        ]"#;

        let defs: Vec<GestureDefinition> = serde_json::from_str(json).unwrap();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].time_window, Duration::from_millis(500));
        assert_eq!(defs[1].time_window, DEFAULT_TIME_WINDOW);
        assert_eq!(defs[1].fire, FireMode::Once);
        match &defs[1].kind {
            GestureKind::Combo { steps } => {
                assert_eq!(steps[1], ComboStep::down(Key::Char('c')));
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(defs[2].tag(), KindTag::Shape);
    }
}
