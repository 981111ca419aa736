//! Match notification and delivery.
//!
//! Every match produces one [`MatchEvent`]. It is handed to the definition's
//! own callback synchronously, inside the sweep, and then queued to every
//! channel subscriber for deferred handling on another thread.

use crate::core::gesture::{GestureId, KindTag, MatchCallback};
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A detected gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Unique per match, so deferred consumers can drop duplicates
    pub event_id: Uuid,
    pub gesture_id: GestureId,
    pub kind: KindTag,
    /// Tick time at which the match was detected
    pub detected_at: DateTime<Utc>,
    /// Timestamp of the first sample of the matched sequence
    pub span_start: DateTime<Utc>,
    /// Timestamp of the last sample of the matched sequence
    pub span_end: DateTime<Utc>,
    /// Recognizer score, for shape gestures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl MatchEvent {
    pub fn new(
        gesture_id: GestureId,
        kind: KindTag,
        detected_at: DateTime<Utc>,
        span_start: DateTime<Utc>,
        span_end: DateTime<Utc>,
        score: Option<f64>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            gesture_id,
            kind,
            detected_at,
            span_start,
            span_end,
            score,
        }
    }
}

/// Delivers match events to callbacks and channel subscribers.
#[derive(Debug, Default)]
pub struct Dispatcher {
    subscribers: Vec<Sender<MatchEvent>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new deferred delivery channel.
    pub fn subscribe(&mut self) -> Receiver<MatchEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Run the callback, then queue the event to every live subscriber.
    pub fn dispatch(&mut self, event: &MatchEvent, callback: Option<&MatchCallback>) {
        if let Some(callback) = callback {
            callback(event);
        }

        // Subscribers whose receiver is gone are dropped
        self.subscribers
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}
