// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the collision subsystem (vector, AABB, direction).
//!
//! Determinism notes:
//! - Overlap semantics are strict: touching edges are not a collision, so a
//!   box pushed exactly flush against another is considered resolved.
//! - Boxes are normalized on construction; callers may pass corners in any
//!   order.

#[doc = "Axis-aligned bounding boxes (world space)."]
pub mod aabb;
#[doc = "Cardinal contact directions and the direction flipper."]
pub mod direction;
#[doc = "Two-component vectors for points and displacements."]
pub mod vec2;
