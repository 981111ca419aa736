//! Statistics module for the gesture engine.
//!
//! Tracks what the engine has processed so hosts can display it or persist
//! it between runs.

pub mod counters;

// Re-export commonly used types
pub use counters::{
    create_shared_stats, create_shared_stats_with_persistence, EngineStats, PersistedStats,
    SharedEngineStats, StatsSnapshot,
};
