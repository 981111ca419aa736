//! Registry of active gesture definitions.
//!
//! Definitions are validated when registered. Shape templates are normalized
//! once here so the per-tick sweep only normalizes the candidate stroke.

use crate::core::gesture::{GestureDefinition, GestureId, GestureKind};
use crate::core::unistroke::{Recognizer, StrokeError};
use crate::input::types::Point;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Why a definition was rejected at registration.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedReason {
    EmptyId,
    ZeroTimeWindow,
    EmptyCombo,
    /// Template has fewer than two points
    TemplateTooShort(usize),
    /// Template points all coincide. Only templates are rejected for this;
    /// a degenerate candidate stroke is a no-match at sweep time.
    DegenerateTemplate,
    /// Match threshold is negative or not a number
    InvalidThreshold(f64),
    /// Dead zone is negative or not a number
    InvalidDeadZone(f64),
    /// Reference direction has zero length
    ZeroDirection,
    /// Angle threshold outside (0, 180]
    InvalidAngle(f64),
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::EmptyId => write!(f, "identifier is empty"),
            MalformedReason::ZeroTimeWindow => write!(f, "time window is zero"),
            MalformedReason::EmptyCombo => write!(f, "combo has no steps"),
            MalformedReason::TemplateTooShort(n) => {
                write!(f, "template has {n} point(s), need at least 2")
            }
            MalformedReason::DegenerateTemplate => write!(f, "template points all coincide"),
            MalformedReason::InvalidThreshold(v) => write!(f, "invalid match threshold {v}"),
            MalformedReason::InvalidDeadZone(v) => write!(f, "invalid dead zone {v}"),
            MalformedReason::ZeroDirection => write!(f, "swipe direction has zero length"),
            MalformedReason::InvalidAngle(v) => write!(f, "invalid angle threshold {v}"),
        }
    }
}

/// Registration errors. Neither is fatal to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A gesture with this identifier exists; it was kept unchanged
    DuplicateId(GestureId),
    /// The definition failed validation
    Malformed {
        id: GestureId,
        reason: MalformedReason,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateId(id) => write!(f, "Gesture '{id}' is already registered"),
            RegistryError::Malformed { id, reason } => {
                write!(f, "Gesture '{id}' is malformed: {reason}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// A validated definition plus data derived at registration.
#[derive(Debug)]
pub struct RegisteredGesture {
    pub definition: GestureDefinition,
    /// Normalized template, for shape gestures
    pub prepared: Option<Vec<Point>>,
}

impl RegisteredGesture {
    pub fn id(&self) -> &str {
        &self.definition.id
    }
}

/// Mapping from identifier to registered gesture.
///
/// Iteration follows identifier order, so it is stable across ticks.
#[derive(Debug, Default)]
pub struct GestureRegistry {
    gestures: BTreeMap<GestureId, Arc<RegisteredGesture>>,
}

impl GestureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a definition.
    pub fn register(
        &mut self,
        definition: GestureDefinition,
        recognizer: &Recognizer,
    ) -> Result<(), RegistryError> {
        if self.gestures.contains_key(&definition.id) {
            return Err(RegistryError::DuplicateId(definition.id));
        }

        let prepared = validate(&definition, recognizer).map_err(|reason| {
            RegistryError::Malformed {
                id: definition.id.clone(),
                reason,
            }
        })?;

        self.gestures.insert(
            definition.id.clone(),
            Arc::new(RegisteredGesture {
                definition,
                prepared,
            }),
        );
        Ok(())
    }

    /// Remove a gesture. Returns whether it was present.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.gestures.remove(id).is_some()
    }

    /// Snapshot of every registered gesture.
    ///
    /// The snapshot is unaffected by later register/unregister calls.
    pub fn list(&self) -> Vec<Arc<RegisteredGesture>> {
        self.gestures.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Arc<RegisteredGesture>> {
        self.gestures.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.gestures.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Longest time window among registered gestures.
    pub fn max_time_window(&self) -> Option<Duration> {
        self.gestures
            .values()
            .map(|g| g.definition.time_window)
            .max()
    }
}

/// Check a definition and derive its prepared template.
fn validate(
    definition: &GestureDefinition,
    recognizer: &Recognizer,
) -> Result<Option<Vec<Point>>, MalformedReason> {
    if definition.id.trim().is_empty() {
        return Err(MalformedReason::EmptyId);
    }
    if definition.time_window.is_zero() {
        return Err(MalformedReason::ZeroTimeWindow);
    }

    match &definition.kind {
        GestureKind::Combo { steps } => {
            if steps.is_empty() {
                return Err(MalformedReason::EmptyCombo);
            }
            Ok(None)
        }
        GestureKind::Swipe(spec) => {
            if spec.dead_zone.is_nan() || spec.dead_zone < 0.0 {
                return Err(MalformedReason::InvalidDeadZone(spec.dead_zone));
            }
            let magnitude = spec.direction.magnitude();
            if magnitude == 0.0 || magnitude.is_nan() {
                return Err(MalformedReason::ZeroDirection);
            }
            let angle = spec.angle_threshold;
            if angle.is_nan() || angle <= 0.0 || angle > 180.0 {
                return Err(MalformedReason::InvalidAngle(spec.angle_threshold));
            }
            Ok(None)
        }
        GestureKind::Shape(spec) => {
            if spec.template.len() < 2 {
                return Err(MalformedReason::TemplateTooShort(spec.template.len()));
            }
            if spec.threshold.is_nan() || spec.threshold < 0.0 {
                return Err(MalformedReason::InvalidThreshold(spec.threshold));
            }
            match recognizer.prepare(&spec.template) {
                Ok(prepared) => Ok(Some(prepared)),
                Err(StrokeError::TooFewPoints(n)) => Err(MalformedReason::TemplateTooShort(n)),
                Err(StrokeError::Degenerate) => Err(MalformedReason::DegenerateTemplate),
            }
        }
    }
}
