//! Sliding-window buffer of recent input samples.
//!
//! Samples are kept oldest-first in arrival order. Every sample gets a
//! sequence number so callers can refer to a position in the stream even
//! after older samples have been pruned and slice indices have shifted.

use crate::input::types::Sample;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Default maximum number of buffered samples.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Errors raised when appending to the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferError {
    /// The sample is older than the current tail.
    OutOfOrder {
        tail: DateTime<Utc>,
        sample: DateTime<Utc>,
    },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::OutOfOrder { tail, sample } => {
                write!(f, "Sample at {sample} precedes buffer tail at {tail}")
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// Append-only ring of recent samples.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    /// Sequence number of `samples[0]`
    first_seq: u64,
    capacity: usize,
    /// Samples dropped because the buffer was full
    evicted: u64,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::new(),
            first_seq: 0,
            capacity: capacity.max(1),
            evicted: 0,
        }
    }

    /// Add a sample to the tail.
    ///
    /// Returns the sequence number assigned to the sample.
    pub fn append(&mut self, sample: Sample) -> Result<u64, BufferError> {
        if let Some(tail) = self.samples.last() {
            if sample.timestamp < tail.timestamp {
                return Err(BufferError::OutOfOrder {
                    tail: tail.timestamp,
                    sample: sample.timestamp,
                });
            }
        }

        if self.samples.len() == self.capacity {
            self.drop_front(1);
            self.evicted += 1;
        }

        self.samples.push(sample);
        Ok(self.next_seq() - 1)
    }

    /// Remove every sample older than `retention` at time `now`.
    ///
    /// A sample exactly `retention` old is kept. Returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        // Timestamps are sorted, so the expired samples form a prefix
        let expired = self
            .samples
            .partition_point(|s| age(s.timestamp, now) > retention);
        self.drop_front(expired);
        expired
    }

    /// Current contents, oldest first.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Samples with a sequence number greater than `after`, together with the
    /// sequence number of the first returned sample.
    pub fn since(&self, after: Option<u64>) -> (&[Sample], u64) {
        let skip = match after {
            Some(seq) if seq >= self.first_seq => {
                ((seq - self.first_seq + 1) as usize).min(self.samples.len())
            }
            _ => 0,
        };
        (&self.samples[skip..], self.first_seq + skip as u64)
    }

    /// Sequence number the next appended sample will receive.
    pub fn next_seq(&self) -> u64 {
        self.first_seq + self.samples.len() as u64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total samples evicted by the capacity cap.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    fn drop_front(&mut self, count: usize) {
        if count > 0 {
            self.samples.drain(..count);
            self.first_seq += count as u64;
        }
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

/// Age of `timestamp` at `now`; samples from the future have age zero.
fn age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - timestamp).to_std().unwrap_or_default()
}
