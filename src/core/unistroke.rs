//! Single-stroke geometric recognizer.
//!
//! Strokes are normalized for position, size and orientation before being
//! compared point by point:
//!
//! 1. Resample to a fixed number of points equally spaced along the path
//! 2. Find the indicative angle (first point to centroid)
//! 3. Rotate about the centroid so the indicative angle becomes zero
//! 4. Scale non-uniformly into a reference square
//! 5. Translate the centroid to the origin
//!
//! The score of two normalized strokes is their mean pointwise distance
//! divided by the square's diagonal. Lower is better; identical shapes score 0.

use crate::input::types::Point;
use serde::{Deserialize, Serialize};

/// Number of points every stroke is resampled to.
pub const DEFAULT_POINTS: usize = 64;

/// Side of the reference square strokes are scaled into.
pub const DEFAULT_SQUARE_SIZE: f64 = 250.0;

/// Path lengths and extents below this are treated as zero.
const EPSILON: f64 = 1e-9;

/// Reasons a stroke cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeError {
    /// Fewer than two input points
    TooFewPoints(usize),
    /// All points coincide, so the path has no length
    Degenerate,
}

impl std::fmt::Display for StrokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrokeError::TooFewPoints(n) => write!(f, "Stroke has {n} point(s), need at least 2"),
            StrokeError::Degenerate => write!(f, "Stroke has fewer than 2 distinct points"),
        }
    }
}

impl std::error::Error for StrokeError {}

/// Recognizer parameters. Holds no per-stroke state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recognizer {
    /// Resample count (N)
    pub points: usize,
    /// Reference square side (S)
    pub square_size: f64,
}

impl Default for Recognizer {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            square_size: DEFAULT_SQUARE_SIZE,
        }
    }
}

/// A template scored by [`Recognizer::rank`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<'a> {
    pub name: &'a str,
    pub score: f64,
}

impl Recognizer {
    pub fn new(points: usize, square_size: f64) -> Self {
        Self {
            points: points.max(2),
            square_size,
        }
    }

    /// Resample `path` to exactly `self.points` points spaced evenly by arc length.
    ///
    /// Works in two passes over an immutable input: cumulative distances
    /// first, then one interpolated point per target distance.
    pub fn resample(&self, path: &[Point]) -> Result<Vec<Point>, StrokeError> {
        if path.len() < 2 {
            return Err(StrokeError::TooFewPoints(path.len()));
        }

        let mut cumulative = Vec::with_capacity(path.len());
        cumulative.push(0.0);
        for pair in path.windows(2) {
            let last = cumulative[cumulative.len() - 1];
            cumulative.push(last + pair[0].distance(&pair[1]));
        }

        let total = cumulative[cumulative.len() - 1];
        if total < EPSILON {
            return Err(StrokeError::Degenerate);
        }

        let n = self.points.max(2);
        let interval = total / (n - 1) as f64;
        let mut out = Vec::with_capacity(n);
        out.push(path[0]);

        let mut segment = 1;
        for k in 1..n - 1 {
            let target = interval * k as f64;
            while segment < cumulative.len() - 1 && cumulative[segment] < target {
                segment += 1;
            }
            let start = cumulative[segment - 1];
            let length = cumulative[segment] - start;
            let t = if length > 0.0 {
                ((target - start) / length).clamp(0.0, 1.0)
            } else {
                0.0
            };
            out.push(path[segment - 1].lerp(&path[segment], t));
        }

        // The final point is the path's end, never an accumulated estimate
        out.push(path[path.len() - 1]);
        Ok(out)
    }

    /// Full normalization pipeline. The result has exactly `self.points` points.
    pub fn normalize(&self, path: &[Point]) -> Result<Vec<Point>, StrokeError> {
        let points = self.resample(path)?;
        let angle = indicative_angle(&points);
        let points = rotate_by(&points, -angle);
        let points = self.scale_to_square(&points);
        Ok(translate_to_origin(&points))
    }

    /// Normalize a template once so it can be scored repeatedly.
    pub fn prepare(&self, template: &[Point]) -> Result<Vec<Point>, StrokeError> {
        self.normalize(template)
    }

    /// Scale so the bounding box spans the reference square on both axes.
    ///
    /// A zero extent on either axis keeps that axis at scale 1.
    pub fn scale_to_square(&self, points: &[Point]) -> Vec<Point> {
        let (min, max) = bounding_box(points);
        let width = max.x - min.x;
        let height = max.y - min.y;
        let sx = if width > EPSILON {
            self.square_size / width
        } else {
            1.0
        };
        let sy = if height > EPSILON {
            self.square_size / height
        } else {
            1.0
        };

        points
            .iter()
            .map(|p| Point::new((p.x - min.x) * sx, (p.y - min.y) * sy))
            .collect()
    }

    /// Score a raw candidate against a raw template.
    pub fn score(&self, candidate: &[Point], template: &[Point]) -> Result<f64, StrokeError> {
        let template = self.prepare(template)?;
        self.score_prepared(candidate, &template)
    }

    /// Score a raw candidate against an already normalized template.
    pub fn score_prepared(
        &self,
        candidate: &[Point],
        prepared: &[Point],
    ) -> Result<f64, StrokeError> {
        let candidate = self.normalize(candidate)?;
        Ok(self.distance(&candidate, prepared))
    }

    /// Mean index-aligned distance between two normalized strokes, divided
    /// by the reference square's diagonal.
    pub fn distance(&self, a: &[Point], b: &[Point]) -> f64 {
        let n = a.len().min(b.len());
        if n == 0 {
            return f64::INFINITY;
        }
        let total: f64 = a.iter().zip(b).map(|(p, q)| p.distance(q)).sum();
        total / n as f64 / self.diagonal()
    }

    /// Score a candidate against named, already normalized templates and
    /// return them best first.
    pub fn rank<'a, I>(&self, candidate: &[Point], templates: I) -> Result<Vec<Ranked<'a>>, StrokeError>
    where
        I: IntoIterator<Item = (&'a str, &'a [Point])>,
    {
        let candidate = self.normalize(candidate)?;
        let mut ranked: Vec<Ranked<'a>> = templates
            .into_iter()
            .map(|(name, template)| Ranked {
                name,
                score: self.distance(&candidate, template),
            })
            .collect();
        ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
        Ok(ranked)
    }

    fn diagonal(&self) -> f64 {
        std::f64::consts::SQRT_2 * self.square_size
    }
}

/// Mean of all points.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Angle from the first point to the centroid, in radians.
pub fn indicative_angle(points: &[Point]) -> f64 {
    match points.first() {
        Some(first) => {
            let c = centroid(points);
            (c.y - first.y).atan2(c.x - first.x)
        }
        None => 0.0,
    }
}

/// Rotate every point about the centroid by `radians`.
pub fn rotate_by(points: &[Point], radians: f64) -> Vec<Point> {
    let c = centroid(points);
    let (sin, cos) = radians.sin_cos();
    points
        .iter()
        .map(|p| {
            let dx = p.x - c.x;
            let dy = p.y - c.y;
            Point::new(dx * cos - dy * sin + c.x, dx * sin + dy * cos + c.y)
        })
        .collect()
}

/// Shift so the centroid sits at the origin.
pub fn translate_to_origin(points: &[Point]) -> Vec<Point> {
    let c = centroid(points);
    points
        .iter()
        .map(|p| Point::new(p.x - c.x, p.y - c.y))
        .collect()
}

/// Total length of a polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

fn bounding_box(points: &[Point]) -> (Point, Point) {
    points.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    )
}
