// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops::RangeInclusive;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::broad::quadtree::{Hit, Quadtree, Spatial};
use crate::types::aabb::Aabb;

/// Cell count above which `add` and `test` log the span they are about to walk.
pub const WIDE_SPAN_CELLS: u64 = 4096;

/// Integer cell coordinate `(floor(x / cell_size), floor(y / cell_size))`.
pub type CellCoord = (i64, i64);

/// Unbounded tiling of same-sized quadtrees.
///
/// The world has no fixed bounds, so space is cut into square cells of
/// `cell_size` and each touched cell owns one [`Quadtree`] covering exactly
/// that cell. An item is copied into every cell its bounds touch.
///
/// Cells are created on first insertion and never freed, even when emptied;
/// growth is bounded by how much of the world has been visited.
#[derive(Debug, Clone)]
pub struct QuadtreeGrid<B> {
    cell_size: f64,
    max_depth: u32,
    cells: FxHashMap<CellCoord, Quadtree<B>>,
    /// Bounds each key was last placed with; drives removal.
    placed: FxHashMap<String, Aabb>,
}

impl<B: Spatial + Clone> QuadtreeGrid<B> {
    /// Creates an empty grid. `cell_size` must be positive and finite.
    #[must_use]
    pub fn new(cell_size: f64, max_depth: u32) -> Self {
        Self {
            cell_size,
            max_depth,
            cells: FxHashMap::default(),
            placed: FxHashMap::default(),
        }
    }

    /// Side length of one cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Depth limit of every cell's tree.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Number of cells created so far.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of distinct items stored.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Returns `true` when no items are stored.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Returns `true` if an item with `key` is stored.
    pub fn contains(&self, key: &str) -> bool {
        self.placed.contains_key(key)
    }

    /// Cell index along one axis for world coordinate `v`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_coord(&self, v: f64) -> i64 {
        (v / self.cell_size).floor() as i64
    }

    /// Number of cells `bounds` touches, saturating at `u64::MAX`.
    pub fn cell_span(&self, bounds: &Aabb) -> u64 {
        let (xs, ys) = self.cell_range(&bounds.normalized());
        let w = xs.end().abs_diff(*xs.start()).saturating_add(1);
        let h = ys.end().abs_diff(*ys.start()).saturating_add(1);
        w.saturating_mul(h)
    }

    /// Adds an item to every cell its bounds touch, creating cells as needed.
    /// Adding a key that is already present re-places it.
    ///
    /// Cost is linear in [`QuadtreeGrid::cell_span`]; items are expected to
    /// be small relative to `cell_size`. Spans above [`WIDE_SPAN_CELLS`] are
    /// logged at debug level.
    pub fn add(&mut self, item: B) {
        if self.placed.contains_key(item.key()) {
            self.remove(item.key());
        }
        let bounds = item.aabb().normalized();
        let span = self.cell_span(&bounds);
        if span > WIDE_SPAN_CELLS {
            debug!(key = item.key(), cells = span, "item spans many grid cells");
        }
        let (xs, ys) = self.cell_range(&bounds);
        for cx in xs {
            for cy in ys.clone() {
                let cell_size = self.cell_size;
                let max_depth = self.max_depth;
                self.cells
                    .entry((cx, cy))
                    .or_insert_with(|| Quadtree::new(cell_region(cx, cy, cell_size), max_depth))
                    .insert(item.clone());
            }
        }
        self.placed.insert(item.key().to_owned(), bounds);
    }

    /// Repositions an item: remove by key, then add with the new bounds.
    pub fn update(&mut self, item: B) {
        self.remove(item.key());
        self.add(item);
    }

    /// Removes the item with `key` from every cell it was placed in.
    pub fn remove(&mut self, key: &str) -> Option<B> {
        let bounds = self.placed.remove(key)?;
        let (xs, ys) = self.cell_range(&bounds);
        let mut removed = None;
        for cx in xs {
            for cy in ys.clone() {
                if let Some(tree) = self.cells.get_mut(&(cx, cy)) {
                    if let Some(item) = tree.remove(key, &bounds) {
                        removed = Some(item);
                    }
                }
            }
        }
        removed
    }

    /// Queries every existing cell `area` touches.
    ///
    /// Each distinct item reaches `test` at most once per call even when it
    /// is stored in several of the visited cells. Like `add`, cost grows with
    /// the number of cells `area` touches.
    pub fn test<'a, R, F>(&'a self, area: &Aabb, mut test: F) -> Vec<Hit<'a, B, R>>
    where
        F: FnMut(&'a B) -> Option<R>,
    {
        let area = area.normalized();
        let span = self.cell_span(&area);
        if span > WIDE_SPAN_CELLS {
            debug!(cells = span, "query spans many grid cells");
        }
        let (xs, ys) = self.cell_range(&area);
        let mut seen: FxHashSet<&'a str> = FxHashSet::default();
        let mut out = Vec::new();
        for cx in xs {
            for cy in ys.clone() {
                let Some(tree) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                out.extend(tree.query(&area, |item: &'a B| {
                    if seen.insert(item.key()) {
                        test(item)
                    } else {
                        None
                    }
                }));
            }
        }
        out
    }

    fn cell_range(&self, bounds: &Aabb) -> (RangeInclusive<i64>, RangeInclusive<i64>) {
        (
            self.cell_coord(bounds.x1)..=self.cell_coord(bounds.x2),
            self.cell_coord(bounds.y1)..=self.cell_coord(bounds.y2),
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn cell_region(cx: i64, cy: i64, cell_size: f64) -> Aabb {
    let x = cx as f64 * cell_size;
    let y = cy as f64 * cell_size;
    Aabb::new(x, y, x + cell_size, y + cell_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(String, Aabb);

    impl Spatial for Item {
        fn key(&self) -> &str {
            &self.0
        }

        fn aabb(&self) -> Aabb {
            self.1
        }
    }

    fn item(key: &str, x1: f64, y1: f64, x2: f64, y2: f64) -> Item {
        Item(key.to_owned(), Aabb::new(x1, y1, x2, y2))
    }

    #[test]
    fn cell_coords_floor_negative_values() {
        let grid: QuadtreeGrid<Item> = QuadtreeGrid::new(400.0, 5);
        assert_eq!(grid.cell_coord(0.0), 0);
        assert_eq!(grid.cell_coord(399.9), 0);
        assert_eq!(grid.cell_coord(400.0), 1);
        assert_eq!(grid.cell_coord(-0.5), -1);
        assert_eq!(grid.cell_coord(-400.0), -1);
        assert_eq!(grid.cell_coord(-400.5), -2);
    }

    #[test]
    fn cell_span_counts_touched_cells_without_walking_them() {
        let grid: QuadtreeGrid<Item> = QuadtreeGrid::new(400.0, 5);
        assert_eq!(grid.cell_span(&Aabb::new(0.0, 0.0, 10.0, 10.0)), 1);
        assert_eq!(grid.cell_span(&Aabb::new(399.0, 0.0, 401.0, 10.0)), 2);
        assert_eq!(grid.cell_span(&Aabb::new(-1.0, -1.0, 1.0, 1.0)), 4);
        let huge = Aabb::new(-1e9, -1e9, 1e9, 1e9);
        assert_eq!(grid.cell_span(&huge), 5_000_001 * 5_000_001);
        assert!(grid.cell_span(&huge) > WIDE_SPAN_CELLS);
        let extreme = Aabb::new(f64::MIN, f64::MIN, f64::MAX, f64::MAX);
        assert_eq!(grid.cell_span(&extreme), u64::MAX);
    }

    #[test]
    fn spanning_item_is_tested_once() {
        let mut grid = QuadtreeGrid::new(100.0, 5);
        grid.add(item("wide", 50.0, 10.0, 350.0, 20.0));
        assert_eq!(grid.cell_count(), 4);
        let mut calls = 0;
        let hits = grid.test(&Aabb::new(0.0, 0.0, 400.0, 50.0), |_| {
            calls += 1;
            Some(())
        });
        assert_eq!(calls, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn update_moves_item_between_cells() {
        let mut grid = QuadtreeGrid::new(100.0, 5);
        grid.add(item("a", 10.0, 10.0, 20.0, 20.0));
        grid.update(item("a", 510.0, 10.0, 520.0, 20.0));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.cell_count(), 2);
        let old = grid.test(&Aabb::new(0.0, 0.0, 50.0, 50.0), |_| Some(()));
        assert!(old.is_empty());
        let new = grid.test(&Aabb::new(500.0, 0.0, 550.0, 50.0), |_| Some(()));
        assert_eq!(new.len(), 1);
    }

    #[test]
    fn remove_clears_every_cell_but_keeps_cells() {
        let mut grid = QuadtreeGrid::new(100.0, 5);
        grid.add(item("a", 90.0, 90.0, 110.0, 110.0));
        assert_eq!(grid.cell_count(), 4);
        assert!(grid.remove("a").is_some());
        assert!(grid.remove("a").is_none());
        assert!(!grid.contains("a"));
        assert_eq!(grid.cell_count(), 4);
        let hits = grid.test(&Aabb::new(0.0, 0.0, 200.0, 200.0), |_| Some(()));
        assert!(hits.is_empty());
    }

    #[test]
    fn re_adding_a_key_replaces_it() {
        let mut grid = QuadtreeGrid::new(100.0, 5);
        grid.add(item("a", 10.0, 10.0, 20.0, 20.0));
        grid.add(item("a", 30.0, 30.0, 40.0, 40.0));
        assert_eq!(grid.len(), 1);
        let hits = grid.test(&Aabb::new(0.0, 0.0, 100.0, 100.0), |b| Some(b.1));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].result, Aabb::new(30.0, 30.0, 40.0, 40.0));
    }
}
