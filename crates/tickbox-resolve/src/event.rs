// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};
use tickbox_geom::{Direction, Vec2};

/// One box touched by a [`Collision`]'s primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Id of the touched box.
    pub id: String,
    /// `true` when the pair physically pushed and the push was accepted.
    pub dense: bool,
    /// Side of the primary that made contact, if known.
    pub direction: Option<Direction>,
}

impl Contact {
    pub(crate) fn new(id: &str, dense: bool, direction: Option<Direction>) -> Self {
        Self {
            id: id.to_owned(),
            dense,
            direction,
        }
    }
}

/// Resolver output unit: a correction for `primary` plus everything it
/// touched while that correction was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// Id of the box the displacement applies to.
    pub primary: String,
    /// Translation to add to the primary's authoritative position. Zero for
    /// sensor contacts and abandoned pushes.
    pub displacement: Vec2,
    /// Touched boxes; the first entry is the pair being resolved, if any.
    pub secondary: Vec<Contact>,
}

impl Collision {
    /// `true` when this event moves its primary and the first contact was
    /// accepted as a physical push.
    pub fn is_resolution(&self) -> bool {
        !self.displacement.is_zero() && self.secondary.first().is_some_and(|c| c.dense)
    }
}
