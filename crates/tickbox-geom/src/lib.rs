// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![deny(
    clippy::all,
    clippy::pedantic,
    rust_2018_idioms,
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![doc = r"2D collision geometry for Tickbox.

This crate provides:
- Plain geometric types (`Vec2`, `Aabb`, `Direction`).
- A stateless narrow phase (`test_collision`) returning ranked penetration
  vectors built from the Minkowski difference of two boxes.
- A depth-bounded `Quadtree` stored as a node arena.
- An unbounded `QuadtreeGrid` tiling the world with same-sized quadtrees.

Design notes:
- Screen-style axes: `+x` is right, `+y` is down.
- Overlap is strict: boxes that only touch do not collide.
- `f64` throughout; world coordinates are usually integral and stay exact.
- Nothing here allocates global state; de-duplication sets live per call.
"]

/// Broad phase: quadtree and quadtree grid.
pub mod broad;
/// Narrow phase: pairwise AABB overlap and penetration vectors.
pub mod narrow;
/// Foundational geometry types.
pub mod types;

pub use broad::grid::{CellCoord, QuadtreeGrid, WIDE_SPAN_CELLS};
pub use broad::quadtree::{Hit, Quadtree, Spatial};
pub use narrow::detector::{test_collision, Penetration};
pub use types::aabb::Aabb;
pub use types::direction::{flip, Direction};
pub use types::vec2::Vec2;
