//! Sample source adapters.
//!
//! The platform input layer is outside this crate. It plugs in through the
//! [`SampleSource`] trait, which the engine polls once per tick. Three
//! adapters ship here: a noop source, a channel-backed source for hosts that
//! capture on another thread, and a scripted source for replays and tests.

use crate::input::types::Sample;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::collections::VecDeque;

/// Default capacity of the channel between a capture thread and the engine.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Something that yields zero or more samples per tick.
///
/// Implementations must deliver samples with non-decreasing timestamps.
pub trait SampleSource {
    /// Push every sample available at `now` into `out`.
    fn poll(&mut self, now: DateTime<Utc>, out: &mut Vec<Sample>);

    /// Whether the source can still produce samples.
    fn is_open(&self) -> bool {
        true
    }
}

/// A source that never yields anything. Used when the host pushes samples
/// directly through [`GestureEngine::ingest`](crate::engine::GestureEngine::ingest).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSource;

impl SampleSource for NoopSource {
    fn poll(&mut self, _now: DateTime<Utc>, _out: &mut Vec<Sample>) {}
}

/// Errors raised by the sending half of a [`ChannelSource`].
#[derive(Debug)]
pub enum SourceError {
    /// The channel is full; the sample was dropped
    Full,
    /// The engine side has been dropped
    Disconnected,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Full => write!(f, "Sample channel is full"),
            SourceError::Disconnected => write!(f, "Sample channel is disconnected"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Sending half handed to the capture thread.
#[derive(Debug, Clone)]
pub struct SampleSender {
    sender: Sender<Sample>,
}

impl SampleSender {
    /// Queue a sample without blocking the capture thread.
    pub fn send(&self, sample: Sample) -> Result<(), SourceError> {
        self.sender.try_send(sample).map_err(|e| match e {
            TrySendError::Full(_) => SourceError::Full,
            TrySendError::Disconnected(_) => SourceError::Disconnected,
        })
    }
}

/// Source draining a bounded channel filled by another thread.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: Receiver<Sample>,
    open: bool,
}

impl ChannelSource {
    /// Create a connected sender/source pair.
    pub fn new(capacity: usize) -> (SampleSender, Self) {
        let (sender, receiver) = bounded(capacity);
        (
            SampleSender { sender },
            Self {
                receiver,
                open: true,
            },
        )
    }

    /// Number of samples waiting to be polled.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl SampleSource for ChannelSource {
    fn poll(&mut self, _now: DateTime<Utc>, out: &mut Vec<Sample>) {
        loop {
            match self.receiver.try_recv() {
                Ok(sample) => out.push(sample),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.open = false;
                    break;
                }
            }
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Source replaying a prerecorded sequence, releasing each sample once the
/// tick clock reaches its timestamp.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    pending: VecDeque<Sample>,
}

impl ScriptedSource {
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            pending: samples.into_iter().collect(),
        }
    }

    /// Samples not yet released.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Timestamp of the last scripted sample, if any remain.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.pending.back().map(|s| s.timestamp)
    }
}

impl SampleSource for ScriptedSource {
    fn poll(&mut self, now: DateTime<Utc>, out: &mut Vec<Sample>) {
        while self
            .pending
            .front()
            .map_or(false, |sample| sample.timestamp <= now)
        {
            if let Some(sample) = self.pending.pop_front() {
                out.push(sample);
            }
        }
    }

    fn is_open(&self) -> bool {
        !self.pending.is_empty()
    }
}
