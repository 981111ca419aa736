//! Input module for the gesture engine.
//!
//! Platform capture lives outside this crate. This module defines the sample
//! types it must produce, the [`SampleSource`] seam the engine polls, and the
//! live key-state query used by combo gestures.

pub mod keys;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use keys::{KeyStateProvider, TrackedKeys};
pub use source::{
    ChannelSource, NoopSource, SampleSender, SampleSource, ScriptedSource, SourceError,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use types::{Key, MouseButton, Phase, Point, Sample};
