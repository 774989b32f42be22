// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::aabb::Aabb;

/// Item that can live in a spatial index.
///
/// `key` must be unique among the items of one index and stable for the
/// item's lifetime; indexes de-duplicate and remove by it.
pub trait Spatial {
    /// Stable unique identifier.
    fn key(&self) -> &str;
    /// World-space bounds.
    fn aabb(&self) -> Aabb;
}

/// A candidate accepted by a query's test function.
#[derive(Debug)]
pub struct Hit<'a, B, R> {
    /// The stored item.
    pub item: &'a B,
    /// Whatever the test function returned for it.
    pub result: R,
}

#[derive(Debug, Clone)]
struct Node<B> {
    region: Aabb,
    depth: u32,
    /// Items that straddle this node's midlines or sit at max depth.
    items: Vec<B>,
    /// Quadrants in order top-left, top-right, bottom-left, bottom-right.
    children: [Option<usize>; 4],
}

impl<B> Node<B> {
    const fn new(region: Aabb, depth: u32) -> Self {
        Self {
            region,
            depth,
            items: Vec::new(),
            children: [None; 4],
        }
    }
}

/// Depth-bounded quadtree over a fixed region.
///
/// Nodes live in a flat arena and refer to their children by index; quadrant
/// nodes are created on first insertion. An item descends while it fits
/// entirely on one side of both midlines and the depth limit allows, and is
/// stored at the first node where it straddles.
///
/// Items outside the region are accepted: only midline comparisons steer
/// placement, so far-out items simply collect in the outermost quadrants.
#[derive(Debug, Clone)]
pub struct Quadtree<B> {
    nodes: Vec<Node<B>>,
    max_depth: u32,
    len: usize,
}

impl<B: Spatial> Quadtree<B> {
    /// Creates an empty tree covering `region`, subdividing at most
    /// `max_depth` times.
    #[must_use]
    pub fn new(region: Aabb, max_depth: u32) -> Self {
        Self {
            nodes: vec![Node::new(region.normalized(), 0)],
            max_depth,
            len: 0,
        }
    }

    /// Region covered by the root node.
    pub fn region(&self) -> Aabb {
        self.nodes[0].region
    }

    /// Configured depth limit.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts an item.
    pub fn insert(&mut self, item: B) {
        let bounds = item.aabb().normalized();
        let mut idx = 0;
        while let Some(q) = self.descend(idx, &bounds) {
            idx = match self.nodes[idx].children[q] {
                Some(child) => child,
                None => {
                    let region = quadrant_region(&self.nodes[idx].region, q);
                    let depth = self.nodes[idx].depth + 1;
                    let child = self.nodes.len();
                    self.nodes.push(Node::new(region, depth));
                    self.nodes[idx].children[q] = Some(child);
                    child
                }
            };
        }
        self.nodes[idx].items.push(item);
        self.len += 1;
    }

    /// Removes the item with `key`, which must have been inserted with
    /// `bounds`. Walks the insertion path for `bounds` only.
    pub fn remove(&mut self, key: &str, bounds: &Aabb) -> Option<B> {
        let bounds = bounds.normalized();
        let mut idx = 0;
        while let Some(q) = self.descend(idx, &bounds) {
            idx = self.nodes[idx].children[q]?;
        }
        let items = &mut self.nodes[idx].items;
        let pos = items.iter().position(|b| b.key() == key)?;
        self.len -= 1;
        Some(items.remove(pos))
    }

    /// Hands every candidate near `area` to `test` and keeps those it accepts.
    ///
    /// While `area` fits in one quadrant the walk follows that single path,
    /// testing each node's own items on the way down. At the first node where
    /// `area` straddles a midline, that node's entire subtree is tested.
    pub fn query<'a, R, F>(&'a self, area: &Aabb, mut test: F) -> Vec<Hit<'a, B, R>>
    where
        F: FnMut(&'a B) -> Option<R>,
    {
        let area = area.normalized();
        let mut out = Vec::new();
        let mut idx = 0;
        loop {
            let Some(q) = self.descend(idx, &area) else {
                self.scan_subtree(idx, &mut test, &mut out);
                return out;
            };
            test_items(&self.nodes[idx].items, &mut test, &mut out);
            match self.nodes[idx].children[q] {
                Some(child) => idx = child,
                None => return out,
            }
        }
    }

    /// Quadrant `bounds` should descend into from node `idx`, if any.
    fn descend(&self, idx: usize, bounds: &Aabb) -> Option<usize> {
        let node = &self.nodes[idx];
        if node.depth >= self.max_depth {
            return None;
        }
        quadrant_of(&node.region, bounds)
    }

    fn scan_subtree<'a, R, F>(&'a self, root: usize, test: &mut F, out: &mut Vec<Hit<'a, B, R>>)
    where
        F: FnMut(&'a B) -> Option<R>,
    {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            test_items(&node.items, test, out);
            // Reverse push so quadrants pop in 0..4 order.
            stack.extend(node.children.iter().rev().flatten());
        }
    }
}

fn test_items<'a, B, R, F>(items: &'a [B], test: &mut F, out: &mut Vec<Hit<'a, B, R>>)
where
    F: FnMut(&'a B) -> Option<R>,
{
    for item in items {
        if let Some(result) = test(item) {
            out.push(Hit { item, result });
        }
    }
}

/// Quadrant of `region` that fully contains `bounds`, or `None` when `bounds`
/// touches or crosses either midline.
fn quadrant_of(region: &Aabb, bounds: &Aabb) -> Option<usize> {
    let mid = region.center();
    let left = bounds.x2 < mid.x;
    let right = bounds.x1 > mid.x;
    let top = bounds.y2 < mid.y;
    let bottom = bounds.y1 > mid.y;
    match (left, right, top, bottom) {
        (true, _, true, _) => Some(0),
        (_, true, true, _) => Some(1),
        (true, _, _, true) => Some(2),
        (_, true, _, true) => Some(3),
        _ => None,
    }
}

fn quadrant_region(region: &Aabb, q: usize) -> Aabb {
    let mid = region.center();
    match q {
        0 => Aabb::new(region.x1, region.y1, mid.x, mid.y),
        1 => Aabb::new(mid.x, region.y1, region.x2, mid.y),
        2 => Aabb::new(region.x1, mid.y, mid.x, region.y2),
        _ => Aabb::new(mid.x, mid.y, region.x2, region.y2),
    }
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

    fn keys<R>(hits: &[Hit<'_, Item, R>]) -> Vec<String> {
        let mut k: Vec<String> = hits.iter().map(|h| h.item.0.clone()).collect();
        k.sort();
        k
    }

    #[test]
    fn small_items_descend_and_create_nodes_lazily() {
        let mut tree = Quadtree::new(Aabb::new(0.0, 0.0, 400.0, 400.0), 5);
        assert_eq!(tree.node_count(), 1);
        tree.insert(item("a", 1.0, 1.0, 3.0, 3.0));
        // 400 -> 200 -> 100 -> 50 -> 25 -> 12.5: five levels below the root.
        assert_eq!(tree.node_count(), 6);
        tree.insert(item("b", 2.0, 2.0, 4.0, 4.0));
        assert_eq!(tree.node_count(), 6);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn straddling_item_stays_at_root() {
        let mut tree = Quadtree::new(Aabb::new(0.0, 0.0, 400.0, 400.0), 5);
        tree.insert(item("mid", 190.0, 10.0, 210.0, 20.0));
        assert_eq!(tree.node_count(), 1);
        // Touching the midline counts as straddling.
        tree.insert(item("edge", 100.0, 100.0, 200.0, 150.0));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn narrow_query_skips_other_quadrants() {
        let mut tree = Quadtree::new(Aabb::new(0.0, 0.0, 400.0, 400.0), 5);
        tree.insert(item("tl", 10.0, 10.0, 20.0, 20.0));
        tree.insert(item("br", 300.0, 300.0, 310.0, 310.0));
        tree.insert(item("root", 150.0, 150.0, 250.0, 250.0));
        let mut seen = Vec::new();
        let hits = tree.query(&Aabb::new(5.0, 5.0, 30.0, 30.0), |b| {
            seen.push(b.0.clone());
            Some(())
        });
        seen.sort();
        assert_eq!(seen, vec!["root".to_owned(), "tl".to_owned()]);
        assert_eq!(keys(&hits), seen);
    }

    #[test]
    fn straddling_query_scans_whole_subtree() {
        let mut tree = Quadtree::new(Aabb::new(0.0, 0.0, 400.0, 400.0), 5);
        tree.insert(item("tl", 10.0, 10.0, 20.0, 20.0));
        tree.insert(item("br", 300.0, 300.0, 310.0, 310.0));
        let hits = tree.query(&Aabb::new(190.0, 190.0, 210.0, 210.0), |_| Some(1));
        assert_eq!(keys(&hits), vec!["br".to_owned(), "tl".to_owned()]);
        assert!(hits.iter().all(|h| h.result == 1));
    }

    #[test]
    fn test_function_filters_results() {
        let mut tree = Quadtree::new(Aabb::new(0.0, 0.0, 400.0, 400.0), 3);
        tree.insert(item("a", 10.0, 10.0, 20.0, 20.0));
        tree.insert(item("b", 12.0, 12.0, 22.0, 22.0));
        let q = Aabb::new(0.0, 0.0, 15.0, 15.0);
        let hits = tree.query(&q, |b| b.aabb().overlaps(&q).then_some(()));
        assert_eq!(keys(&hits), vec!["a".to_owned(), "b".to_owned()]);
        let q = Aabb::new(0.0, 0.0, 11.0, 11.0);
        let hits = tree.query(&q, |b| b.aabb().overlaps(&q).then_some(()));
        assert_eq!(keys(&hits), vec!["a".to_owned()]);
    }

    #[test]
    fn remove_follows_insert_path() {
        let mut tree = Quadtree::new(Aabb::new(0.0, 0.0, 400.0, 400.0), 5);
        let a = item("a", 10.0, 10.0, 20.0, 20.0);
        tree.insert(a.clone());
        tree.insert(item("b", 190.0, 10.0, 210.0, 20.0));
        assert_eq!(tree.remove("a", &a.1), Some(a.clone()));
        assert_eq!(tree.remove("a", &a.1), None);
        // Wrong bounds walk a different path.
        assert_eq!(tree.remove("b", &a.1), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn depth_limit_stops_descent() {
        let mut tree = Quadtree::new(Aabb::new(0.0, 0.0, 400.0, 400.0), 0);
        tree.insert(item("a", 1.0, 1.0, 2.0, 2.0));
        assert_eq!(tree.node_count(), 1);
        let hits = tree.query(&Aabb::new(1.0, 1.0, 2.0, 2.0), |_| Some(()));
        assert_eq!(hits.len(), 1);
    }
}
