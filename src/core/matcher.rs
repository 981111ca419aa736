//! Per-gesture matching against buffered samples.
//!
//! Every matcher takes a read-only slice of samples (oldest first) and either
//! returns the span of samples that satisfied the gesture or a [`Reject`]
//! explaining why not. Rejections are ordinary outcomes, never errors: a
//! sweep keeps evaluating the remaining gestures regardless.

use crate::core::gesture::{ComboStep, Edge, GestureKind, ShapeSpec, SwipeSpec};
use crate::core::registry::RegisteredGesture;
use crate::core::unistroke::Recognizer;
use crate::input::keys::KeyStateProvider;
use crate::input::types::{Point, Sample};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Indices (inclusive) into the evaluated slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A successful match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub span: Span,
    /// Recognizer score, for shape gestures
    pub score: Option<f64>,
}

/// Why a gesture did not match this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reject {
    /// No complete down-to-up interval in the buffer
    IncompleteSpan,
    /// The candidate stroke has fewer than two distinct points
    DegenerateStroke,
    /// The sequence took longer than the gesture's time window
    WindowExceeded { elapsed: Duration },
    /// Displacement not greater than the dead zone
    BelowDeadZone { distance: f64 },
    /// Angle to the reference direction not below the threshold
    OffDirection { degrees: f64 },
    /// Score not below the match threshold
    ScoreAboveThreshold { score: f64 },
    /// Only `matched` of `total` combo steps were seen
    ComboIncomplete { matched: usize, total: usize },
}

impl std::fmt::Display for Reject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reject::IncompleteSpan => write!(f, "no complete down/up span"),
            Reject::DegenerateStroke => write!(f, "degenerate stroke"),
            Reject::WindowExceeded { elapsed } => write!(f, "took {elapsed:?}"),
            Reject::BelowDeadZone { distance } => write!(f, "moved only {distance:.1}"),
            Reject::OffDirection { degrees } => write!(f, "{degrees:.1} degrees off direction"),
            Reject::ScoreAboveThreshold { score } => write!(f, "score {score:.3}"),
            Reject::ComboIncomplete { matched, total } => {
                write!(f, "{matched}/{total} combo steps")
            }
        }
    }
}

/// Shared inputs for one sweep.
pub struct MatchContext<'a> {
    pub recognizer: &'a Recognizer,
    pub keys: &'a dyn KeyStateProvider,
    /// Whether `Down` combo steps also require the key to be held right now
    pub require_held: bool,
}

/// Evaluate one registered gesture against `samples`.
pub fn evaluate(
    gesture: &RegisteredGesture,
    samples: &[Sample],
    ctx: &MatchContext<'_>,
) -> Result<Hit, Reject> {
    let window = gesture.definition.time_window;
    match &gesture.definition.kind {
        GestureKind::Combo { steps } => {
            match_combo(steps, window, samples, ctx.keys, ctx.require_held)
                .map(|span| Hit { span, score: None })
        }
        GestureKind::Swipe(spec) => {
            match_swipe(spec, window, samples).map(|span| Hit { span, score: None })
        }
        GestureKind::Shape(spec) => match gesture.prepared.as_deref() {
            Some(prepared) => match_shape(spec, prepared, window, samples, ctx.recognizer),
            None => Err(Reject::DegenerateStroke),
        },
    }
}

/// Ordered, non-contiguous key combo.
///
/// Unrelated samples between steps are skipped. A `Down` step needs the key
/// to be held at sweep time when `require_held` is set. The span from the
/// first to the last step must fit in `window`; if the earliest start does
/// not, later starts are tried.
pub fn match_combo(
    steps: &[ComboStep],
    window: Duration,
    samples: &[Sample],
    keys: &dyn KeyStateProvider,
    require_held: bool,
) -> Result<Span, Reject> {
    let Some(first_step) = steps.first() else {
        return Err(Reject::ComboIncomplete {
            matched: 0,
            total: 0,
        });
    };

    let satisfies = |sample: &Sample, step: &ComboStep| -> bool {
        if sample.key != Some(step.key) {
            return false;
        }
        match step.edge {
            Edge::Down => sample.is_down() && (!require_held || keys.is_key_held(step.key)),
            Edge::Up => sample.is_up(),
        }
    };

    let mut best_progress = 0;
    let mut last_elapsed = None;

    for start in (0..samples.len()).filter(|&i| satisfies(&samples[i], first_step)) {
        let mut cursor = 1;
        let mut end = start;
        for (offset, sample) in samples[start + 1..].iter().enumerate() {
            if cursor == steps.len() {
                break;
            }
            if satisfies(sample, &steps[cursor]) {
                cursor += 1;
                end = start + 1 + offset;
            }
        }

        best_progress = best_progress.max(cursor);
        if cursor < steps.len() {
            // Later starts see a subset of these samples and cannot do better
            break;
        }

        let elapsed = elapsed(samples[start].timestamp, samples[end].timestamp);
        if elapsed <= window {
            return Ok(Span { start, end });
        }
        last_elapsed = Some(elapsed);
    }

    match last_elapsed {
        Some(elapsed) => Err(Reject::WindowExceeded { elapsed }),
        None => Err(Reject::ComboIncomplete {
            matched: best_progress,
            total: steps.len(),
        }),
    }
}

/// Directional swipe from the earliest pointer press to the latest release.
///
/// The displacement must be strictly greater than the dead zone and the
/// angle to the reference direction strictly less than the threshold.
/// An older unconsumed stroke still in `samples` stretches the span, so a
/// new swipe can exceed the window until that stroke is pruned.
pub fn match_swipe(spec: &SwipeSpec, window: Duration, samples: &[Sample]) -> Result<Span, Reject> {
    let down = samples.iter().position(|s| s.is_pointer() && s.is_down());
    let up = samples.iter().rposition(|s| s.is_pointer() && s.is_up());

    let (start, end) = match (down, up) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => return Err(Reject::IncompleteSpan),
    };

    let elapsed = elapsed(samples[start].timestamp, samples[end].timestamp);
    if elapsed > window {
        return Err(Reject::WindowExceeded { elapsed });
    }

    let displacement = samples[start].position.to(&samples[end].position);
    let distance = displacement.magnitude();
    if distance <= spec.dead_zone {
        return Err(Reject::BelowDeadZone { distance });
    }

    let degrees = angle_between(&displacement, &spec.direction);
    if degrees < spec.angle_threshold {
        Ok(Span { start, end })
    } else {
        Err(Reject::OffDirection { degrees })
    }
}

/// Shape drawn between the most recent pointer press and the release after it.
pub fn match_shape(
    spec: &ShapeSpec,
    prepared: &[Point],
    window: Duration,
    samples: &[Sample],
    recognizer: &Recognizer,
) -> Result<Hit, Reject> {
    let start = samples
        .iter()
        .rposition(|s| s.is_pointer() && s.is_down())
        .ok_or(Reject::IncompleteSpan)?;
    let end = samples[start + 1..]
        .iter()
        .position(|s| s.is_pointer() && s.is_up())
        .map(|offset| start + 1 + offset)
        .ok_or(Reject::IncompleteSpan)?;

    let elapsed = elapsed(samples[start].timestamp, samples[end].timestamp);
    if elapsed > window {
        return Err(Reject::WindowExceeded { elapsed });
    }

    let stroke: Vec<Point> = samples[start..=end]
        .iter()
        .filter(|s| s.is_pointer())
        .map(|s| s.position)
        .collect();

    let score = recognizer
        .score_prepared(&stroke, prepared)
        .map_err(|_| Reject::DegenerateStroke)?;

    if score < spec.threshold {
        Ok(Hit {
            span: Span { start, end },
            score: Some(score),
        })
    } else {
        Err(Reject::ScoreAboveThreshold { score })
    }
}

/// Angle between two vectors in degrees, in `[0, 180]`.
pub fn angle_between(a: &Point, b: &Point) -> f64 {
    let denom = a.magnitude() * b.magnitude();
    if denom == 0.0 {
        return 180.0;
    }
    let cos = ((a.x * b.x + a.y * b.y) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

fn elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    (to - from).to_std().unwrap_or_default()
}
