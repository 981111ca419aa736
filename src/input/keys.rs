//! Live key state used by combo matching.
//!
//! Combo `Down` steps are checked against the key state at sweep time, not
//! against buffered history. The engine asks a [`KeyStateProvider`] for it.

use crate::input::types::{Key, Sample};
use std::collections::HashSet;

/// Answers whether a key is currently held.
pub trait KeyStateProvider: Send {
    fn is_key_held(&self, key: Key) -> bool;

    /// Called by the engine for every ingested sample. Providers backed by
    /// the platform can ignore this; [`TrackedKeys`] uses it to follow edges.
    fn observe(&mut self, _sample: &Sample) {}
}

/// Key state derived from the press/release edges the engine ingests.
#[derive(Debug, Default, Clone)]
pub struct TrackedKeys {
    held: HashSet<Key>,
}

impl TrackedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held or released.
    pub fn set_held(&mut self, key: Key, held: bool) {
        if held {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}

impl KeyStateProvider for TrackedKeys {
    fn is_key_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn observe(&mut self, sample: &Sample) {
        if let Some(key) = sample.key {
            if sample.is_down() {
                self.set_held(key, true);
            } else if sample.is_up() {
                self.set_held(key, false);
            }
        }
    }
}

impl<F> KeyStateProvider for F
where
    F: Fn(Key) -> bool + Send,
{
    fn is_key_held(&self, key: Key) -> bool {
        self(key)
    }
}
