//! Built-in template strokes.
//!
//! Coordinates use screen orientation (y grows downward). Each template
//! starts where a user would naturally start drawing it.

use crate::input::types::Point;

/// A named template stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: &'static str,
    pub points: Vec<Point>,
}

fn polyline(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().copied().map(Point::from).collect()
}

/// Closed square drawn clockwise from the top-left corner.
pub fn square() -> Vec<Point> {
    polyline(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)])
}

/// Closed triangle drawn from the apex.
pub fn triangle() -> Vec<Point> {
    polyline(&[(0.5, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.0)])
}

/// Circle drawn clockwise from the right-most point.
pub fn circle() -> Vec<Point> {
    const SEGMENTS: usize = 32;
    (0..=SEGMENTS)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / SEGMENTS as f64;
            Point::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Four-segment zig-zag.
pub fn zigzag() -> Vec<Point> {
    polyline(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0), (4.0, 0.0)])
}

/// Check mark: short stroke down-right, long stroke up-right.
pub fn check() -> Vec<Point> {
    polyline(&[(0.0, 1.0), (1.0, 2.0), (3.0, 0.0)])
}

/// Caret: up then down.
pub fn caret() -> Vec<Point> {
    polyline(&[(0.0, 2.0), (1.0, 0.0), (2.0, 2.0)])
}

/// Every built-in template.
pub fn builtin() -> Vec<Template> {
    vec![
        Template {
            name: "square",
            points: square(),
        },
        Template {
            name: "triangle",
            points: triangle(),
        },
        Template {
            name: "circle",
            points: circle(),
        },
        Template {
            name: "zigzag",
            points: zigzag(),
        },
        Template {
            name: "check",
            points: check(),
        },
        Template {
            name: "caret",
            points: caret(),
        },
    ]
}

/// Look up a built-in template by name.
pub fn by_name(name: &str) -> Option<Vec<Point>> {
    builtin()
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.points)
}
