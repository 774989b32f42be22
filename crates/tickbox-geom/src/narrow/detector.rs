// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::aabb::Aabb;
use crate::types::direction::{flip, Direction};
use crate::types::vec2::Vec2;

/// Minimum translation that separates the first box of a test from the second
/// along one axis.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Penetration {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// Way the first box moves when this vector is applied.
    pub direction: Option<Direction>,
}

impl Penetration {
    /// Creates a labeled penetration vector.
    pub const fn new(x: f64, y: f64, direction: Option<Direction>) -> Self {
        Self { x, y, direction }
    }

    /// The translation as a plain vector.
    pub fn vector(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Squared magnitude, the ranking key used throughout resolution.
    pub fn length_squared(&self) -> f64 {
        self.vector().length_squared()
    }

    /// Scales the translation, keeping the label. `ratio` is expected positive.
    pub fn scaled(&self, ratio: f64) -> Self {
        let v = self.vector().scale(ratio);
        Self::new(v.x, v.y, self.direction)
    }

    /// The share of this translation applied to the *other* box: scaled by
    /// `-ratio` with the label flipped.
    pub fn mirrored(&self, ratio: f64) -> Self {
        let v = self.vector().scale(-ratio);
        Self::new(v.x, v.y, flip(self.direction))
    }

    /// Adds another translation on top of this one. The combined vector keeps
    /// this vector's label.
    pub fn combined(&self, other: &Self) -> Self {
        let v = self.vector().add(&other.vector());
        Self::new(v.x, v.y, self.direction)
    }
}

/// Minkowski difference `a - b`. Contains the origin strictly iff the boxes
/// overlap.
#[must_use]
pub fn minkowski_difference(a: &Aabb, b: &Aabb) -> Aabb {
    Aabb {
        x1: a.x1 - b.x2,
        y1: a.y1 - b.y2,
        x2: a.x2 - b.x1,
        y2: a.y2 - b.y1,
    }
}

/// Tests two boxes for overlap and ranks the ways to separate them.
///
/// Returns `None` when the boxes do not overlap (touching is not overlap).
/// Otherwise returns one vector per Minkowski edge, each translating `a` out
/// of `b`, sorted ascending by squared length. Edges whose normal is
/// degenerate are dropped, so fewer than four vectors may come back.
///
/// Inputs are normalized first; corner order does not matter.
#[must_use]
pub fn test_collision(a: &Aabb, b: &Aabb) -> Option<Vec<Penetration>> {
    let d = minkowski_difference(&a.normalized(), &b.normalized());
    if !(d.x1 < 0.0 && d.y1 < 0.0 && d.x2 > 0.0 && d.y2 > 0.0) {
        return None;
    }

    // Corner walk y1 -> x2 -> y2 -> x1; pairs with Direction::EDGE_ORDER.
    let corners = [
        Vec2::new(d.x1, d.y1),
        Vec2::new(d.x2, d.y1),
        Vec2::new(d.x2, d.y2),
        Vec2::new(d.x1, d.y2),
    ];
    let mut out: Vec<Penetration> = (0..4)
        .filter_map(|i| {
            let start = corners[i];
            let end = corners[(i + 1) % 4];
            edge_penetration(Vec2::ZERO, start, end)
                .map(|v| Penetration::new(v.x, v.y, Some(Direction::EDGE_ORDER[i])))
        })
        .collect();
    out.sort_by(|p, q| p.length_squared().total_cmp(&q.length_squared()));
    Some(out)
}

/// Translation that carries `origin` onto the edge `start -> end` along the
/// edge's outward normal, or `None` for a zero-length edge.
fn edge_penetration(origin: Vec2, start: Vec2, end: Vec2) -> Option<Vec2> {
    let normal = outward_normal(start, end)?;
    let hit = ray_line_intersection(origin, normal, start, end)?;
    Some(origin.sub(&hit))
}

/// Unit outward normal of a clockwise-on-screen edge (`+y` down).
fn outward_normal(start: Vec2, end: Vec2) -> Option<Vec2> {
    let edge = end.sub(&start);
    let len = edge.length();
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    // Divide per component so axis-aligned normals come out as exact ±1.
    Some(Vec2::new(edge.y / len, -edge.x / len))
}

/// Intersects the ray `origin + t * dir` with the infinite line through
/// `a` and `b`. Returns `None` when the ray is parallel to the line or the
/// line is degenerate.
fn ray_line_intersection(origin: Vec2, dir: Vec2, a: Vec2, b: Vec2) -> Option<Vec2> {
    let line = b.sub(&a);
    let denom = dir.cross(&line);
    if denom == 0.0 {
        return None;
    }
    let to_line = a.sub(&origin);
    let t = if dir.dot(&line) == 0.0 {
        // Ray runs along the line's normal: the hit is the projection of `a`.
        to_line.dot(&dir) / dir.length_squared()
    } else {
        to_line.cross(&line) / denom
    };
    Some(origin.add(&dir.scale(t)))
}
