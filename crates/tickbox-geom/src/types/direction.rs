// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

/// Cardinal direction label carried by penetration vectors and contacts.
///
/// On a penetration vector it names the way the first box moves; on a
/// contact it names the side of the primary box that was touched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Toward `+y`.
    Down,
    /// Toward `-x`.
    Left,
    /// Toward `-y`.
    Up,
    /// Toward `+x`.
    Right,
}

impl Direction {
    /// Labels in Minkowski edge construction order.
    pub const EDGE_ORDER: [Self; 4] = [Self::Down, Self::Left, Self::Up, Self::Right];

    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
        }
    }
}

/// Inverts an optional direction label for the other side of a contact.
///
/// An absent label stays absent: contacts without a cardinal direction carry
/// no side information.
#[must_use]
pub const fn flip(direction: Option<Direction>) -> Option<Direction> {
    match direction {
        Some(d) => Some(d.opposite()),
        None => None,
    }
}
