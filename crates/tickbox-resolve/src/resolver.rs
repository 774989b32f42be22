// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Three-pass per-tick collision resolution.
//!
//! Resolution order matters and is observable in the returned event list:
//! dynamic-vs-static, then dynamic-vs-dynamic, then a static re-check of the
//! boxes the second pass moved. Each pass reads the positions the previous
//! one produced.
//!
//! Per box, dense candidates are visited worst-first (largest minimal
//! penetration first). A static obstacle takes the full correction and ends
//! the scan once one is accepted; a dynamic pair is split, each side getting
//! `push_ratio` of the correction. A correction is accepted only if the moved
//! box clears every dense neighbour in the same grid except the pair partner,
//! trying the two cheapest vectors and, for each, one extra push out of the
//! blocking neighbour. When nothing clears, the overlap is left in place and the pair
//! is reported as non-dense.

use rustc_hash::{FxHashMap, FxHashSet};
use tickbox_geom::{flip, test_collision, Aabb, Penetration, QuadtreeGrid, Vec2};
use tracing::{debug, instrument, trace};

use crate::config::{ConfigError, ResolverConfig};
use crate::event::{Collision, Contact};
use crate::hitbox::Hitbox;

/// The two indexes a resolver works against.
#[derive(Debug, Clone)]
pub struct Grids {
    /// Boxes that never move.
    pub statics: QuadtreeGrid<Hitbox>,
    /// Boxes the resolver may displace.
    pub dynamics: QuadtreeGrid<Hitbox>,
}

impl Grids {
    fn layer(&self, layer: Layer) -> &QuadtreeGrid<Hitbox> {
        match layer {
            Layer::Static => &self.statics,
            Layer::Dynamic => &self.dynamics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Static,
    Dynamic,
}

/// A neighbour overlapping the box under test, with its ranked corrections.
#[derive(Debug)]
struct Candidate {
    id: String,
    is_static: bool,
    penetration: Vec<Penetration>,
}

impl Candidate {
    fn min_penetration(&self) -> f64 {
        self.penetration
            .first()
            .map_or(0.0, Penetration::length_squared)
    }
}

fn sort_worst_first(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.min_penetration().total_cmp(&a.min_penetration()));
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

/// Authoritative collision resolver.
///
/// [`CollisionResolver::check`] is a pure function of its inputs apart from
/// the grid updates it performs. [`CollisionResolver::tick`] additionally owns
/// the grids between ticks and keeps the last resolved box set to update the
/// dynamic grid incrementally.
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    config: ResolverConfig,
    grids: Option<Grids>,
    last_hitboxes: FxHashMap<String, Hitbox>,
}

impl CollisionResolver {
    /// Creates a resolver. The config is used as given; see
    /// [`CollisionResolver::try_new`] for a validating constructor.
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            grids: None,
            last_hitboxes: FxHashMap::default(),
        }
    }

    /// Validates `config` and creates a resolver.
    pub fn try_new(config: ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolved state of `id` after the last [`CollisionResolver::tick`].
    pub fn last_hitbox(&self, id: &str) -> Option<&Hitbox> {
        self.last_hitboxes.get(id)
    }

    /// Drops the owned grids and the cached box set.
    pub fn reset(&mut self) {
        self.grids = None;
        self.last_hitboxes.clear();
    }

    /// Partitions `boxes` by the static flag and indexes each side in its own
    /// grid.
    pub fn make_grids(&self, boxes: &[Hitbox]) -> Grids {
        let mut grids = Grids {
            statics: QuadtreeGrid::new(self.config.cell_size, self.config.max_depth),
            dynamics: QuadtreeGrid::new(self.config.cell_size, self.config.max_depth),
        };
        for hitbox in boxes {
            if hitbox.is_static {
                grids.statics.add(hitbox.clone());
            } else {
                grids.dynamics.add(hitbox.clone());
            }
        }
        grids
    }

    /// Runs the three passes for one tick and returns the events in pass
    /// order.
    ///
    /// `can_push(a, b)` decides whether two particular boxes physically push;
    /// it may be called several times for the same pair. Displaced dynamic
    /// boxes are re-placed in `grids.dynamics` at their resolved positions.
    #[instrument(skip_all, fields(boxes = boxes.len()))]
    pub fn check<F>(&self, grids: &mut Grids, boxes: &[Hitbox], can_push: F) -> Vec<Collision>
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.run(grids, boxes, can_push).0
    }

    /// Resolves one tick against grids owned by the resolver.
    ///
    /// The static grid is rebuilt when the static set differs from last
    /// tick's; otherwise only changed dynamic boxes are re-placed.
    #[instrument(skip_all, fields(boxes = boxes.len()))]
    pub fn tick<F>(&mut self, boxes: &[Hitbox], can_push: F) -> Vec<Collision>
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut grids = match self.grids.take() {
            Some(mut grids) if self.statics_unchanged(boxes) => {
                self.sync_dynamics(&mut grids, boxes);
                grids
            }
            _ => {
                debug!("rebuilding grids");
                self.make_grids(boxes)
            }
        };
        let (events, resolved) = self.run(&mut grids, boxes, can_push);
        self.last_hitboxes = resolved;
        self.grids = Some(grids);
        events
    }

    fn statics_unchanged(&self, boxes: &[Hitbox]) -> bool {
        let cached = self.last_hitboxes.values().filter(|h| h.is_static).count();
        let mut current = 0;
        for hitbox in boxes.iter().filter(|h| h.is_static) {
            current += 1;
            match self.last_hitboxes.get(hitbox.id.as_str()) {
                Some(prev) if prev.is_static && prev.bounds == hitbox.bounds.normalized() => {}
                _ => return false,
            }
        }
        current == cached
    }

    fn sync_dynamics(&self, grids: &mut Grids, boxes: &[Hitbox]) {
        let mut live: FxHashSet<&str> = FxHashSet::default();
        for hitbox in boxes.iter().filter(|h| !h.is_static) {
            live.insert(hitbox.id.as_str());
            match self.last_hitboxes.get(hitbox.id.as_str()) {
                Some(prev)
                    if prev.bounds == hitbox.bounds.normalized() && prev.dense == hitbox.dense => {}
                _ => grids.dynamics.update(hitbox.clone()),
            }
        }
        for prev in self.last_hitboxes.values() {
            if !prev.is_static && !live.contains(prev.id.as_str()) {
                grids.dynamics.remove(&prev.id);
            }
        }
    }

    fn run<F>(
        &self,
        grids: &mut Grids,
        boxes: &[Hitbox],
        can_push: F,
    ) -> (Vec<Collision>, FxHashMap<String, Hitbox>)
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut pass = Pass::new(self.config.push_ratio, boxes, can_push);
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let dynamic_ids: Vec<&str> = boxes
            .iter()
            .filter(|h| !h.is_static)
            .map(|h| h.id.as_str())
            .filter(|id| seen.insert(*id))
            .collect();
        let mut events = Vec::new();

        let mut unused = FxHashSet::default();
        for id in &dynamic_ids {
            pass.handle_collisions(grids, Layer::Static, id, &mut unused, &mut events);
        }
        let first_pass = events.len();
        debug!(events = first_pass, "dynamic-vs-static pass");

        let mut resolved_pairs = FxHashSet::default();
        for id in &dynamic_ids {
            pass.handle_collisions(grids, Layer::Dynamic, id, &mut resolved_pairs, &mut events);
        }
        let second_pass = events.len();
        debug!(events = second_pass - first_pass, "dynamic-vs-dynamic pass");

        let mut moved: FxHashSet<&str> = FxHashSet::default();
        let displaced: Vec<String> = events[first_pass..]
            .iter()
            .filter(|e| !e.displacement.is_zero())
            .filter(|e| moved.insert(e.primary.as_str()))
            .map(|e| e.primary.clone())
            .collect();
        for id in &displaced {
            pass.handle_collisions(grids, Layer::Static, id, &mut unused, &mut events);
        }
        debug!(
            events = events.len() - second_pass,
            rechecked = displaced.len(),
            "static re-check pass"
        );

        (events, pass.boxes)
    }
}

/// Working state of one `check` call.
struct Pass<F> {
    push_ratio: f64,
    /// Working copy of every box by id; corrections land here first.
    boxes: FxHashMap<String, Hitbox>,
    can_push: F,
}

impl<F> Pass<F>
where
    F: FnMut(&str, &str) -> bool,
{
    fn new(push_ratio: f64, boxes: &[Hitbox], can_push: F) -> Self {
        let boxes = boxes
            .iter()
            .map(|h| {
                let mut h = h.clone();
                h.bounds = h.bounds.normalized();
                (h.id.clone(), h)
            })
            .collect();
        Self {
            push_ratio,
            boxes,
            can_push,
        }
    }

    fn bounds_of(&self, id: &str) -> Option<Aabb> {
        self.boxes.get(id).map(|h| h.bounds)
    }

    /// Neighbours in `grid` overlapping `area`, measured at their working
    /// positions. Ids missing from the working set are skipped.
    fn overlapping(
        &self,
        grid: &QuadtreeGrid<Hitbox>,
        id: &str,
        area: &Aabb,
        exclude: Option<&str>,
    ) -> Vec<Candidate> {
        grid.test(area, |stored| {
            if stored.id == id || exclude == Some(stored.id.as_str()) {
                return None;
            }
            let current = self.boxes.get(stored.id.as_str())?;
            test_collision(area, &current.bounds)
        })
        .into_iter()
        .map(|hit| Candidate {
            id: hit.item.id.clone(),
            is_static: hit.item.is_static,
            penetration: hit.result,
        })
        .collect()
    }

    /// Splits candidates into pushing ones and sensor contacts.
    fn partition(&mut self, id: &str, candidates: Vec<Candidate>) -> (Vec<Candidate>, Vec<Contact>) {
        let mut dense = Vec::new();
        let mut contacts = Vec::new();
        for candidate in candidates {
            if (self.can_push)(id, &candidate.id) {
                dense.push(candidate);
            } else {
                trace!(primary = id, other = %candidate.id, "sensor contact");
                let direction = flip(candidate.penetration.first().and_then(|p| p.direction));
                contacts.push(Contact::new(&candidate.id, false, direction));
            }
        }
        (dense, contacts)
    }

    fn handle_collisions(
        &mut self,
        grids: &mut Grids,
        layer: Layer,
        id: &str,
        resolved_pairs: &mut FxHashSet<(String, String)>,
        events: &mut Vec<Collision>,
    ) {
        let Some(bounds) = self.bounds_of(id) else {
            return;
        };
        let hits = self.overlapping(grids.layer(layer), id, &bounds, None);
        let (mut dense, contacts) = self.partition(id, hits);
        if !contacts.is_empty() {
            events.push(Collision {
                primary: id.to_owned(),
                displacement: Vec2::ZERO,
                secondary: contacts,
            });
        }
        sort_worst_first(&mut dense);

        for candidate in dense {
            if candidate.is_static {
                let event = self.find_collision_events(
                    grids.layer(layer),
                    id,
                    &candidate.id,
                    &candidate.penetration,
                );
                let accepted = event.is_resolution();
                self.apply(grids, &event);
                events.push(event);
                if accepted {
                    break;
                }
                continue;
            }

            if !resolved_pairs.insert(pair_key(id, &candidate.id)) {
                continue;
            }
            // Earlier pushes in this pass may have moved either side.
            let (Some(a), Some(b)) = (self.bounds_of(id), self.bounds_of(&candidate.id)) else {
                continue;
            };
            let Some(penetration) = test_collision(&a, &b) else {
                trace!(primary = id, other = %candidate.id, "pair already separated");
                continue;
            };
            let ours: Vec<Penetration> =
                penetration.iter().map(|p| p.scaled(self.push_ratio)).collect();
            let theirs: Vec<Penetration> =
                penetration.iter().map(|p| p.mirrored(self.push_ratio)).collect();

            let event =
                self.find_collision_events(grids.layer(layer), id, &candidate.id, &ours);
            self.apply(grids, &event);
            events.push(event);

            let event =
                self.find_collision_events(grids.layer(layer), &candidate.id, id, &theirs);
            self.apply(grids, &event);
            events.push(event);
        }
    }

    /// Picks a correction for `id` out of `other`, or gives up.
    ///
    /// `other` is left out of every re-query: the offsets already describe
    /// how the pair separates.
    fn find_collision_events(
        &mut self,
        grid: &QuadtreeGrid<Hitbox>,
        id: &str,
        other: &str,
        offsets: &[Penetration],
    ) -> Collision {
        let give_up = || Collision {
            primary: id.to_owned(),
            displacement: Vec2::ZERO,
            secondary: vec![Contact::new(
                other,
                false,
                flip(offsets.first().and_then(|o| o.direction)),
            )],
        };
        let Some(base) = self.bounds_of(id) else {
            return give_up();
        };

        for offset in offsets.iter().take(2) {
            let moved = base.translated(offset.vector());
            let hits = self.overlapping(grid, id, &moved, Some(other));
            let (mut blocking, contacts) = self.partition(id, hits);
            if blocking.is_empty() {
                let mut secondary = vec![Contact::new(other, true, flip(offset.direction))];
                secondary.extend(contacts);
                return Collision {
                    primary: id.to_owned(),
                    displacement: offset.vector(),
                    secondary,
                };
            }

            sort_worst_first(&mut blocking);
            for tertiary in &blocking {
                for extra in tertiary.penetration.iter().take(2) {
                    let combined = offset.combined(extra);
                    let moved = base.translated(combined.vector());
                    let hits = self.overlapping(grid, id, &moved, Some(other));
                    let (still_blocking, contacts) = self.partition(id, hits);
                    if still_blocking.is_empty() {
                        let mut secondary = vec![
                            Contact::new(other, true, flip(offset.direction)),
                            Contact::new(&tertiary.id, true, flip(extra.direction)),
                        ];
                        secondary.extend(contacts);
                        return Collision {
                            primary: id.to_owned(),
                            displacement: combined.vector(),
                            secondary,
                        };
                    }
                }
            }
        }

        debug!(primary = id, other, "no correction clears the pair; leaving overlap");
        give_up()
    }

    fn apply(&mut self, grids: &mut Grids, event: &Collision) {
        if event.displacement.is_zero() {
            return;
        }
        let Some(hitbox) = self.boxes.get_mut(event.primary.as_str()) else {
            return;
        };
        hitbox.bounds = hitbox.bounds.translated(event.displacement);
        if !hitbox.is_static {
            grids.dynamics.update(hitbox.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, min: f64) -> Candidate {
        Candidate {
            id: id.to_owned(),
            is_static: true,
            penetration: vec![Penetration::new(min, 0.0, None)],
        }
    }

    #[test]
    fn worst_overlap_sorts_first_and_ties_keep_order() {
        let mut c = vec![
            candidate("a", 1.0),
            candidate("b", 3.0),
            candidate("c", 1.0),
            candidate("d", 2.0),
        ];
        sort_worst_first(&mut c);
        let ids: Vec<&str> = c.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn pair_key_is_unordered() {
        assert_eq!(pair_key("x", "y"), pair_key("y", "x"));
    }

    #[test]
    fn static_set_change_is_detected() {
        let wall = Hitbox::fixed("wall", Aabb::new(0.0, 0.0, 10.0, 10.0));
        let mut resolver = CollisionResolver::default();
        let _ = resolver.tick(std::slice::from_ref(&wall), |_, _| true);
        assert!(resolver.statics_unchanged(std::slice::from_ref(&wall)));
        assert!(!resolver.statics_unchanged(&[]));
        let moved = Hitbox::fixed("wall", Aabb::new(1.0, 0.0, 11.0, 10.0));
        assert!(!resolver.statics_unchanged(&[moved]));
        let demoted = wall.with_static(false);
        assert!(!resolver.statics_unchanged(&[demoted]));
    }
}
