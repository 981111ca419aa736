//! Engine activity counters.
//!
//! Counters are atomics so a host can read them from another thread while the
//! engine ticks. They can optionally be persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running totals for one engine.
#[derive(Debug)]
pub struct EngineStats {
    /// Ticks executed
    ticks: AtomicU64,
    /// Samples appended to the buffer
    samples_ingested: AtomicU64,
    /// Samples refused (out of order)
    samples_rejected: AtomicU64,
    /// Samples removed by retention pruning
    samples_pruned: AtomicU64,
    /// Samples dropped by the capacity cap
    samples_evicted: AtomicU64,
    /// Gesture matches dispatched
    matches: AtomicU64,
    /// Definitions refused at registration
    registrations_rejected: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl EngineStats {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            samples_ingested: AtomicU64::new(0),
            samples_rejected: AtomicU64::new(0),
            samples_pruned: AtomicU64::new(0),
            samples_evicted: AtomicU64::new(0),
            matches: AtomicU64::new(0),
            registrations_rejected: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create stats that resume from, and save to, `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            tracing::warn!("Could not load previous engine stats: {e}");
        }

        stats
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingested(&self) {
        self.samples_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_sample(&self) {
        self.samples_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pruned(&self, count: u64) {
        self.samples_pruned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_evicted(&self, count: u64) {
        self.samples_evicted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_match(&self) {
        self.matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_registration(&self) {
        self.registrations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            samples_ingested: self.samples_ingested.load(Ordering::Relaxed),
            samples_rejected: self.samples_rejected.load(Ordering::Relaxed),
            samples_pruned: self.samples_pruned.load(Ordering::Relaxed),
            samples_evicted: self.samples_evicted.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            registrations_rejected: self.registrations_rejected.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Engine Statistics:\n\
             - Ticks: {}\n\
             - Samples ingested: {}\n\
             - Samples rejected: {}\n\
             - Samples pruned: {}\n\
             - Samples evicted: {}\n\
             - Matches: {}\n\
             - Rejected registrations: {}\n\
             - Session duration: {} seconds",
            stats.ticks,
            stats.samples_ingested,
            stats.samples_rejected,
            stats.samples_pruned,
            stats.samples_evicted,
            stats.matches,
            stats.registrations_rejected,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.snapshot();
            let persisted = PersistedStats {
                ticks: stats.ticks,
                samples_ingested: stats.samples_ingested,
                samples_rejected: stats.samples_rejected,
                samples_pruned: stats.samples_pruned,
                samples_evicted: stats.samples_evicted,
                matches: stats.matches,
                registrations_rejected: stats.registrations_rejected,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.ticks.store(persisted.ticks, Ordering::Relaxed);
                self.samples_ingested
                    .store(persisted.samples_ingested, Ordering::Relaxed);
                self.samples_rejected
                    .store(persisted.samples_rejected, Ordering::Relaxed);
                self.samples_pruned
                    .store(persisted.samples_pruned, Ordering::Relaxed);
                self.samples_evicted
                    .store(persisted.samples_evicted, Ordering::Relaxed);
                self.matches.store(persisted.matches, Ordering::Relaxed);
                self.registrations_rejected
                    .store(persisted.registrations_rejected, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.ticks,
            &self.samples_ingested,
            &self.samples_rejected,
            &self.samples_pruned,
            &self.samples_evicted,
            &self.matches,
            &self.registrations_rejected,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub samples_ingested: u64,
    pub samples_rejected: u64,
    pub samples_pruned: u64,
    pub samples_evicted: u64,
    pub matches: u64,
    pub registrations_rejected: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedStats {
    pub ticks: u64,
    pub samples_ingested: u64,
    pub samples_rejected: u64,
    pub samples_pruned: u64,
    pub samples_evicted: u64,
    pub matches: u64,
    pub registrations_rejected: u64,
    pub last_updated: DateTime<Utc>,
}

/// Thread-safe shared stats.
pub type SharedEngineStats = Arc<EngineStats>;

pub fn create_shared_stats() -> SharedEngineStats {
    Arc::new(EngineStats::new())
}

pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedEngineStats {
    Arc::new(EngineStats::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let stats = EngineStats::new();

        stats.record_tick();
        stats.record_tick();
        stats.record_ingested();
        stats.record_pruned(5);
        stats.record_match();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.samples_ingested, 1);
        assert_eq!(snapshot.samples_pruned, 5);
        assert_eq!(snapshot.matches, 1);
    }

    #[test]
    fn test_reset() {
        let stats = EngineStats::new();
        stats.record_evicted(10);
        stats.record_rejected_registration();
        stats.reset();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.samples_evicted, 0);
        assert_eq!(snapshot.registrations_rejected, 0);
    }

    #[test]
    fn test_summary_format() {
        let summary = EngineStats::new().summary();
        assert!(summary.contains("Ticks"));
        assert!(summary.contains("Matches"));
        assert!(summary.contains("Samples pruned"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("synheart-gesture-stats-{}", uuid::Uuid::new_v4()))
            .join("stats.json");

        let stats = EngineStats::with_persistence(path.clone());
        stats.record_match();
        stats.record_match();
        stats.save().unwrap();

        let resumed = EngineStats::with_persistence(path.clone());
        assert_eq!(resumed.snapshot().matches, 2);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
