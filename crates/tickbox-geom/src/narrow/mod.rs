// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Narrow phase: exact pairwise box tests.
//!
//! Contract:
//! - `test_collision(a, b)` is `Some` iff `test_collision(b, a)` is `Some`.
//! - Penetration vectors translate the *first* box and are sorted ascending
//!   by squared length, so index `0` is always the cheapest correction.

#[doc = "Minkowski-difference overlap test and penetration ranking."]
pub mod detector;
