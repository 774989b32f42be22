// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase spatial indexes.
//!
//! Contract (applies to both structures here):
//! - Items are value copies keyed by a stable string id ([`quadtree::Spatial`]).
//! - Queries never test overlap themselves; they hand every candidate that
//!   survives quadrant containment to a caller test function and keep the
//!   candidates for which it returns `Some`.
//! - Result order is deterministic for a given insertion order.
//!
//! A query box that straddles a node's midlines falls back to a scan of that
//! node's whole subtree instead of fanning out into several quadrants. This
//! keeps the walk a single path at the price of brute force for wide queries.

#[doc = "Unbounded tiling of same-sized quadtrees."]
pub mod grid;
#[doc = "Depth-bounded quadtree stored as a node arena."]
pub mod quadtree;
