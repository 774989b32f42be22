// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::vec2::Vec2;

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `x1 <= x2` and `y1 <= y2` once constructed; [`Aabb::new`] normalizes
///   corners passed in any order.
/// - Values are `f64` world units, `+y` pointing down.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum x (left edge).
    pub x1: f64,
    /// Minimum y (top edge).
    pub y1: f64,
    /// Maximum x (right edge).
    pub x2: f64,
    /// Maximum y (bottom edge).
    pub y2: f64,
}

impl Aabb {
    /// Constructs an AABB from two opposite corners given in any order.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Returns a copy with corners sorted. Boxes built through [`Aabb::new`]
    /// are already normalized; this is for values assembled field by field.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Width along x.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Height along y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    /// Returns `true` if this AABB strictly overlaps another.
    ///
    /// Touching edges do not count; this matches the narrow phase so that a
    /// box pushed flush against an obstacle reads as separated.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    /// Returns the box shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            x1: self.x1 + offset.x,
            y1: self.y1 + offset.y,
            x2: self.x2 + offset.x,
            y2: self.y2 + offset.y,
        }
    }

    /// Grows the box symmetrically so each side is at least `min_extent` long.
    #[must_use]
    pub fn with_min_extent(&self, min_extent: f64) -> Self {
        let grow_x = ((min_extent - self.width()) * 0.5).max(0.0);
        let grow_y = ((min_extent - self.height()) * 0.5).max(0.0);
        Self {
            x1: self.x1 - grow_x,
            y1: self.y1 - grow_y,
            x2: self.x2 + grow_x,
            y2: self.y2 + grow_y,
        }
    }
}
