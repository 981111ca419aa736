//! Synheart Gesture Engine - Real-time gesture recognition over live input.
//!
//! The engine keeps a sliding window of recent input samples and, on every
//! tick, checks it against the registered gestures:
//!
//! - **Combos**: ordered key press/release sequences within a time window
//! - **Swipes**: press-to-release pointer displacement in a direction
//! - **Shapes**: free-form strokes scored by a unistroke template recognizer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Synheart Gesture Engine                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Sample    │──▶│   Sample    │──▶│  Matchers   │       │
//! │  │   Source    │   │   Buffer    │   │ (per tick)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                           ▲                 │              │
//! │                           │                 ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Key State  │   │  Registry   │   │ Dispatcher  │       │
//! │  │  Provider   │   │ (gestures)  │   │ (callbacks) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use synheart_gesture_engine::{GestureDefinition, GestureEngine, Point, Sample};
//!
//! let mut engine = GestureEngine::default();
//! engine
//!     .register_gesture(GestureDefinition::swipe("right", Point::new(1.0, 0.0), 50.0, 30.0))
//!     .unwrap();
//!
//! let t = Utc::now();
//! engine.ingest(Sample::down(Point::new(0.0, 0.0), t)).unwrap();
//! engine
//!     .ingest(Sample::up(Point::new(200.0, 0.0), t + Duration::milliseconds(120)))
//!     .unwrap();
//!
//! let matches = engine.tick(t + Duration::milliseconds(130));
//! assert_eq!(matches[0].gesture_id, "right");
//! ```

pub mod config;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod input;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, RecognizerConfig};
pub use crate::core::{
    ComboStep, Edge, FireMode, GestureDefinition, GestureId, GestureKind, GestureRegistry, KindTag,
    Recognizer, RegistryError, SampleBuffer, ShapeSpec, SwipeSpec,
};
pub use dispatch::{Dispatcher, MatchEvent};
pub use engine::{create_shared_engine, GestureEngine, SharedEngine};
pub use input::{
    ChannelSource, Key, KeyStateProvider, MouseButton, Phase, Point, Sample, SampleSource,
    ScriptedSource, TrackedKeys,
};
pub use stats::{EngineStats, SharedEngineStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
