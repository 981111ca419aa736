//! Core functionality for the gesture engine.
//!
//! This module contains:
//! - The sliding sample buffer
//! - Gesture definitions and the registry that validates them
//! - The combo, swipe and shape matchers
//! - The unistroke recognizer and built-in templates

pub mod buffer;
pub mod gesture;
pub mod matcher;
pub mod registry;
pub mod templates;
pub mod unistroke;

// Re-export commonly used types
pub use buffer::{BufferError, SampleBuffer, DEFAULT_BUFFER_CAPACITY};
pub use gesture::{
    ComboStep, Edge, FireMode, GestureDefinition, GestureId, GestureKind, KindTag, MatchCallback,
    ShapeSpec, SwipeSpec, DEFAULT_TIME_WINDOW,
};
pub use matcher::{evaluate, Hit, MatchContext, Reject, Span};
pub use registry::{GestureRegistry, MalformedReason, RegisteredGesture, RegistryError};
pub use unistroke::{Recognizer, StrokeError, DEFAULT_POINTS, DEFAULT_SQUARE_SIZE};
