// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! tickbox-resolve: authoritative per-tick collision resolution.
//!
//! The resolver turns a flat set of labeled boxes into position corrections
//! and contact events for one simulation tick. It never touches caller state;
//! everything it decides comes back as an ordered list of [`Collision`]s.
//!
//! Pipeline per tick, strictly in order:
//! 1. every dynamic box against the static grid,
//! 2. every dynamic box against the other dynamic boxes,
//! 3. boxes moved by pass 2 against the static grid again.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod config;
mod event;
mod hitbox;
mod outcome;
mod resolver;

/// Resolver tuning and its validation errors.
pub use config::{
    ConfigError, ResolverConfig, DEFAULT_CELL_SIZE, DEFAULT_MAX_DEPTH, DEFAULT_PUSH_RATIO,
    MAX_TREE_DEPTH,
};
/// Resolver output records.
pub use event::{Collision, Contact};
/// Labeled input boxes.
pub use hitbox::{Hitbox, MIN_EXTENT};
/// Caller-side folding of events into displacements and contact notices.
pub use outcome::{ContactNotice, TickOutcome};
/// The orchestrator and its pair of grids.
pub use resolver::{CollisionResolver, Grids};
/// Geometry re-exports so callers need only this crate.
pub use tickbox_geom::{flip, Aabb, Direction, Vec2};
