// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};
use tickbox_geom::{Aabb, Spatial, Vec2};

/// Smallest side length a hitbox may have in world units.
pub const MIN_EXTENT: f64 = 1.0;

/// Labeled world-space box handed to the resolver each tick.
///
/// `dense` is the caller's hint; whether two particular boxes push each
/// other is decided per pair by the predicate given to
/// [`crate::CollisionResolver::check`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    /// Unique stable id.
    pub id: String,
    /// Static boxes never move and live in their own grid.
    #[serde(rename = "static")]
    pub is_static: bool,
    /// Blocking hint; `false` marks a sensor.
    pub dense: bool,
    /// World-space bounds.
    pub bounds: Aabb,
}

impl Hitbox {
    /// A dense, movable box.
    pub fn dynamic(id: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            id: id.into(),
            is_static: false,
            dense: true,
            bounds: bounds.normalized(),
        }
    }

    /// A dense box that never moves.
    pub fn fixed(id: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            is_static: true,
            ..Self::dynamic(id, bounds)
        }
    }

    /// Converts a box given relative to an entity's `position` into world
    /// space, growing any side shorter than [`MIN_EXTENT`].
    pub fn from_local(id: impl Into<String>, position: Vec2, local: Aabb) -> Self {
        let world = local.normalized().translated(position).with_min_extent(MIN_EXTENT);
        Self::dynamic(id, world)
    }

    /// Sets the blocking hint.
    pub fn with_dense(mut self, dense: bool) -> Self {
        self.dense = dense;
        self
    }

    /// Sets the static flag.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}

impl Spatial for Hitbox {
    fn key(&self) -> &str {
        &self.id
    }

    fn aabb(&self) -> Aabb {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_local_translates_and_clamps() {
        let h = Hitbox::from_local(
            "p",
            Vec2::new(100.0, 50.0),
            Aabb::new(-4.0, -8.0, 4.0, -7.5),
        );
        assert_eq!(h.bounds, Aabb::new(96.0, 41.75, 104.0, 42.75));
        assert!(!h.is_static);
        assert!(h.dense);
    }

    #[test]
    fn serde_uses_static_field_name() {
        let h = Hitbox::fixed("wall", Aabb::new(0.0, 0.0, 1.0, 1.0)).with_dense(false);
        let json = serde_json::to_value(&h).unwrap_or_default();
        assert_eq!(json["static"], serde_json::Value::Bool(true));
        assert_eq!(json["dense"], serde_json::Value::Bool(false));
        assert_eq!(json["bounds"]["x2"], serde_json::json!(1.0));
    }
}
