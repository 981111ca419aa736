//! The gesture engine.
//!
//! [`GestureEngine`] owns the sample buffer, the registry, the key state and
//! the dispatcher. A host drives it by calling [`GestureEngine::tick`] once
//! per frame:
//!
//! 1. Poll the sample source and append everything it yields
//! 2. Prune samples older than the retention window
//! 3. Evaluate every registered gesture against the buffer and dispatch matches
//!
//! Ticks never overlap: `tick` takes `&mut self`. Hosts that share an engine
//! across threads wrap it in a [`SharedEngine`].

use crate::config::Config;
use crate::core::buffer::{BufferError, SampleBuffer};
use crate::core::gesture::{FireMode, GestureDefinition, GestureId};
use crate::core::matcher::{evaluate, MatchContext};
use crate::core::registry::{GestureRegistry, RegistryError};
use crate::core::unistroke::Recognizer;
use crate::dispatch::{Dispatcher, MatchEvent};
use crate::input::keys::{KeyStateProvider, TrackedKeys};
use crate::input::source::{NoopSource, SampleSource};
use crate::input::types::Sample;
use crate::stats::{create_shared_stats, SharedEngineStats};
use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Real-time gesture recognizer.
pub struct GestureEngine {
    config: Config,
    recognizer: Recognizer,
    buffer: SampleBuffer,
    registry: GestureRegistry,
    source: Box<dyn SampleSource + Send>,
    keys: Box<dyn KeyStateProvider>,
    dispatcher: Dispatcher,
    stats: SharedEngineStats,
    /// Per gesture, sequence number of the last sample consumed by a match
    consumed: HashMap<GestureId, u64>,
    /// Scratch space for polled samples
    incoming: Vec<Sample>,
}

impl GestureEngine {
    /// Create an engine with no sample source and edge-tracked key state.
    pub fn new(config: Config) -> Self {
        Self {
            recognizer: config.recognizer.into(),
            buffer: SampleBuffer::new(config.buffer_capacity),
            registry: GestureRegistry::new(),
            source: Box::new(NoopSource),
            keys: Box::new(TrackedKeys::new()),
            dispatcher: Dispatcher::new(),
            stats: create_shared_stats(),
            consumed: HashMap::new(),
            incoming: Vec::new(),
            config,
        }
    }

    /// Poll `source` at the start of every tick.
    pub fn with_source(mut self, source: impl SampleSource + Send + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Answer held-key queries with `keys` instead of tracking edges.
    pub fn with_key_state(mut self, keys: impl KeyStateProvider + 'static) -> Self {
        self.keys = Box::new(keys);
        self
    }

    /// Record activity into shared (possibly persisted) stats.
    pub fn with_stats(mut self, stats: SharedEngineStats) -> Self {
        self.stats = stats;
        self
    }

    /// Add a gesture. A duplicate identifier keeps the existing definition.
    ///
    /// The gesture only sees samples ingested after it is registered, so
    /// re-registering an identifier never replays strokes already buffered.
    pub fn register_gesture(&mut self, definition: GestureDefinition) -> Result<(), RegistryError> {
        let id = definition.id.clone();
        let kind = definition.tag();
        match self.registry.register(definition, &self.recognizer) {
            Ok(()) => {
                match self.buffer.next_seq().checked_sub(1) {
                    Some(newest) => {
                        self.consumed.insert(id.clone(), newest);
                    }
                    None => {
                        self.consumed.remove(&id);
                    }
                }
                info!(gesture = %id, %kind, "registered gesture");
                Ok(())
            }
            Err(e) => {
                warn!("Rejected gesture registration: {e}");
                self.stats.record_rejected_registration();
                Err(e)
            }
        }
    }

    /// Remove a gesture. Does nothing if it is not registered.
    pub fn unregister_gesture(&mut self, id: &str) {
        if self.registry.unregister(id) {
            self.consumed.remove(id);
            info!(gesture = %id, "unregistered gesture");
        }
    }

    /// Receive every future match on a channel.
    pub fn subscribe(&mut self) -> Receiver<MatchEvent> {
        self.dispatcher.subscribe()
    }

    /// Append a sample directly, bypassing the source.
    pub fn ingest(&mut self, sample: Sample) -> Result<(), BufferError> {
        let evicted_before = self.buffer.evicted();
        match self.buffer.append(sample) {
            Ok(seq) => {
                if let Some(appended) = self.buffer.samples().last() {
                    self.keys.observe(appended);
                }
                self.stats.record_ingested();
                let evicted = self.buffer.evicted() - evicted_before;
                if evicted > 0 {
                    self.stats.record_evicted(evicted);
                }
                trace!(seq, "ingested sample");
                Ok(())
            }
            Err(e) => {
                warn!("Dropping sample: {e}");
                self.stats.record_rejected_sample();
                Err(e)
            }
        }
    }

    /// Advance sampling, pruning and matching by one step.
    ///
    /// Returns the matches dispatched during this tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<MatchEvent> {
        self.stats.record_tick();

        let mut incoming = std::mem::take(&mut self.incoming);
        self.source.poll(now, &mut incoming);
        for sample in incoming.drain(..) {
            // Out-of-order samples are logged and counted by ingest
            let _ = self.ingest(sample);
        }
        self.incoming = incoming;

        let retention = self.retention();
        let pruned = self.buffer.prune(now, retention);
        if pruned > 0 {
            debug!(pruned, remaining = self.buffer.len(), "pruned samples");
            self.stats.record_pruned(pruned as u64);
        }

        self.sweep(now)
    }

    /// Evaluate a snapshot of the registry against the buffer.
    fn sweep(&mut self, now: DateTime<Utc>) -> Vec<MatchEvent> {
        let snapshot = self.registry.list();
        let ctx = MatchContext {
            recognizer: &self.recognizer,
            keys: self.keys.as_ref(),
            require_held: self.config.combo_requires_held_key,
        };

        let mut events = Vec::new();
        let mut finished = Vec::new();

        for gesture in &snapshot {
            let id = gesture.id();
            let (view, base_seq) = self.buffer.since(self.consumed.get(id).copied());

            let hit = match evaluate(gesture, view, &ctx) {
                Ok(hit) => hit,
                Err(reject) => {
                    trace!(gesture = %id, %reject, "no match");
                    continue;
                }
            };

            let event = MatchEvent::new(
                id.to_string(),
                gesture.definition.tag(),
                now,
                view[hit.span.start].timestamp,
                view[hit.span.end].timestamp,
                hit.score,
            );
            debug!(gesture = %id, score = ?hit.score, "gesture matched");

            self.consumed
                .insert(id.to_string(), base_seq + hit.span.end as u64);
            self.stats.record_match();
            self.dispatcher
                .dispatch(&event, gesture.definition.callback.as_ref());

            if gesture.definition.fire == FireMode::Once {
                finished.push(id.to_string());
            }
            events.push(event);
        }

        for id in finished {
            self.unregister_gesture(&id);
        }

        events
    }

    /// Current retention: the longest registered time window, or the
    /// configured default when nothing is registered.
    pub fn retention(&self) -> Duration {
        self.registry
            .max_time_window()
            .unwrap_or(self.config.retention)
    }

    /// Whether the source may still produce samples.
    pub fn is_source_open(&self) -> bool {
        self.source.is_open()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn registry(&self) -> &GestureRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &SharedEngineStats {
        &self.stats
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Engine shared between threads. Every access is serialized by the lock.
pub type SharedEngine = Arc<Mutex<GestureEngine>>;

/// Wrap an engine for sharing.
pub fn create_shared_engine(engine: GestureEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}
