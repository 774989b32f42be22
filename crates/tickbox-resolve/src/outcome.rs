// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Folding a tick's events into what the entity layer consumes.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tickbox_geom::{flip, Direction, Vec2};

use crate::event::Collision;
use crate::hitbox::Hitbox;

/// "`target` touched `other` this tick."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactNotice {
    /// Box being notified.
    pub target: String,
    /// Box it touched.
    pub other: String,
    /// Whether the pair pushed.
    pub dense: bool,
    /// Side of `target` that made contact.
    pub direction: Option<Direction>,
}

/// Per-tick summary of a resolver event list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    displacements: Vec<(String, Vec2)>,
    contacts: Vec<ContactNotice>,
}

impl TickOutcome {
    /// Sums displacements per id and derives one notice per ordered pair.
    ///
    /// Both sides of every contact are notified; the secondary side gets the
    /// flipped direction. When a pair shows up in several events, the first
    /// notice wins.
    pub fn from_collisions(events: &[Collision]) -> Self {
        let mut displacements: Vec<(String, Vec2)> = Vec::new();
        let mut slot: FxHashMap<&str, usize> = FxHashMap::default();
        let mut notified: FxHashSet<(&str, &str)> = FxHashSet::default();
        let mut contacts = Vec::new();

        for event in events {
            let primary = event.primary.as_str();
            if !event.displacement.is_zero() {
                if let Some(&i) = slot.get(primary) {
                    let total = &mut displacements[i].1;
                    *total = total.add(&event.displacement);
                } else {
                    slot.insert(primary, displacements.len());
                    displacements.push((primary.to_owned(), event.displacement));
                }
            }
            for contact in &event.secondary {
                let other = contact.id.as_str();
                if notified.insert((primary, other)) {
                    contacts.push(ContactNotice {
                        target: primary.to_owned(),
                        other: other.to_owned(),
                        dense: contact.dense,
                        direction: contact.direction,
                    });
                }
                if notified.insert((other, primary)) {
                    contacts.push(ContactNotice {
                        target: other.to_owned(),
                        other: primary.to_owned(),
                        dense: contact.dense,
                        direction: flip(contact.direction),
                    });
                }
            }
        }

        Self {
            displacements,
            contacts,
        }
    }

    /// Accumulated displacement per id, in first-appearance order.
    pub fn displacements(&self) -> &[(String, Vec2)] {
        &self.displacements
    }

    /// Accumulated displacement of `id`, if any event moved it.
    pub fn displacement_of(&self, id: &str) -> Option<Vec2> {
        self.displacements
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, d)| *d)
    }

    /// Contact notices in dispatch order.
    pub fn contacts(&self) -> &[ContactNotice] {
        &self.contacts
    }

    /// Notices addressed to `target`.
    pub fn contacts_of<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = &'a ContactNotice> + 'a {
        self.contacts.iter().filter(move |c| c.target == target)
    }

    /// Moves each box in `boxes` by its accumulated displacement.
    pub fn apply_to(&self, boxes: &mut [Hitbox]) {
        for hitbox in boxes {
            if let Some(d) = self.displacement_of(&hitbox.id) {
                hitbox.bounds = hitbox.bounds.translated(d);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Contact;
    use tickbox_geom::Aabb;

    fn event(primary: &str, dx: f64, secondary: Vec<Contact>) -> Collision {
        Collision {
            primary: primary.to_owned(),
            displacement: Vec2::new(dx, 0.0),
            secondary,
        }
    }

    #[test]
    fn displacements_accumulate_in_first_seen_order() {
        let events = vec![
            event("b", 2.0, vec![Contact::new("w", true, None)]),
            event("a", 1.0, vec![Contact::new("w", true, None)]),
            event("b", -0.5, vec![Contact::new("a", true, None)]),
            event("c", 0.0, vec![Contact::new("s", false, None)]),
        ];
        let outcome = TickOutcome::from_collisions(&events);
        let ids: Vec<&str> = outcome
            .displacements()
            .iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(outcome.displacement_of("b"), Some(Vec2::new(1.5, 0.0)));
        assert_eq!(outcome.displacement_of("c"), None);
    }

    #[test]
    fn both_sides_are_notified_once() {
        let events = vec![
            event("a", -1.0, vec![Contact::new("b", true, Some(Direction::Right))]),
            event("b", 1.0, vec![Contact::new("a", true, Some(Direction::Left))]),
        ];
        let outcome = TickOutcome::from_collisions(&events);
        assert_eq!(outcome.contacts().len(), 2);
        let to_b: Vec<_> = outcome.contacts_of("b").collect();
        assert_eq!(to_b.len(), 1);
        assert_eq!(to_b[0].other, "a");
        assert_eq!(to_b[0].direction, Some(Direction::Left));
        assert!(to_b[0].dense);
    }

    #[test]
    fn apply_to_moves_only_displaced_boxes() {
        let mut boxes = vec![
            Hitbox::dynamic("a", Aabb::new(0.0, 0.0, 10.0, 10.0)),
            Hitbox::dynamic("b", Aabb::new(20.0, 0.0, 30.0, 10.0)),
        ];
        let outcome = TickOutcome::from_collisions(&[event(
            "a",
            -5.0,
            vec![Contact::new("w", true, Some(Direction::Right))],
        )]);
        outcome.apply_to(&mut boxes);
        assert_eq!(boxes[0].bounds, Aabb::new(-5.0, 0.0, 5.0, 10.0));
        assert_eq!(boxes[1].bounds, Aabb::new(20.0, 0.0, 30.0, 10.0));
    }
}
