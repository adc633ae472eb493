//! Region quadtree over axis-aligned rectangles.
//!
//! DESIGN
//! ======
//! Each node covers a fixed rectangle and keeps the objects that do not fit
//! entirely inside one of its four quadrants. Children are created lazily the
//! first time a node exceeds `max_objects` while `depth < max_depth`; at that
//! point every object held by the node is re-evaluated and the ones that now
//! fit a single quadrant move down. Objects straddling a midpoint (or lying
//! partly outside the root) stay where they are, so no object ever lives in
//! more than one node.
//!
//! Removal matches by identifier. The caller passes the bounds it inserted
//! with as a descent hint; if the hint no longer selects the right quadrant
//! the search falls back to scanning every child, so stale hints cost time
//! but never correctness.

#[cfg(test)]
#[path = "spatial_test.rs"]
mod spatial_test;

use serde::Serialize;
use tracing::trace;

use crate::config::SpatialConfig;
use crate::geom::{Point, Rect};

/// A rectangle with a stable identity stored in a [`QuadTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialObject<K> {
    pub id: K,
    pub bounds: Rect,
}

impl<K> SpatialObject<K> {
    #[must_use]
    pub fn new(id: K, bounds: Rect) -> Self {
        Self { id, bounds }
    }
}

/// Shape of the tree at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TreeStats {
    /// Nodes in the tree, root included.
    pub node_count: usize,
    /// Objects stored across all nodes.
    pub object_count: usize,
    /// Deepest level that holds a node.
    pub max_depth: usize,
}

/// Region quadtree keyed by `K`.
#[derive(Debug)]
pub struct QuadTree<K> {
    root: Node<K>,
    config: SpatialConfig,
    len: usize,
}

#[derive(Debug)]
struct Node<K> {
    bounds: Rect,
    depth: usize,
    objects: Vec<SpatialObject<K>>,
    children: Option<Box<[Node<K>; 4]>>,
}

impl<K: Clone + PartialEq> QuadTree<K> {
    /// Create an empty tree covering `bounds`.
    #[must_use]
    pub fn new(bounds: Rect, config: SpatialConfig) -> Self {
        Self { root: Node::new(bounds, 0), config, len: 0 }
    }

    /// Outer bounds fixed at construction.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.root.bounds
    }

    #[must_use]
    pub fn config(&self) -> SpatialConfig {
        self.config
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `obj` into the smallest node whose quadrant fully contains it.
    pub fn insert(&mut self, obj: SpatialObject<K>) {
        self.root.insert(obj, &self.config);
        self.len += 1;
    }

    /// Remove the object with identifier `id`.
    ///
    /// `hint` should be the bounds the object was inserted with; it only
    /// steers the descent. Returns the removed object, if any.
    pub fn remove(&mut self, id: &K, hint: &Rect) -> Option<SpatialObject<K>> {
        let removed = self.root.remove(id, hint);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// All objects whose bounds intersect `area` (edges and corners count).
    #[must_use]
    pub fn query(&self, area: &Rect) -> Vec<&SpatialObject<K>> {
        let mut out = Vec::new();
        self.root.query(area, &mut out);
        out
    }

    /// All objects whose bounds contain `pt`, borders included.
    #[must_use]
    pub fn query_point(&self, pt: Point) -> Vec<&SpatialObject<K>> {
        let probe = Rect::new(pt.x, pt.y, 1.0, 1.0);
        let mut candidates = self.query(&probe);
        candidates.retain(|obj| obj.bounds.contains_point(pt));
        candidates
    }

    /// Every stored object, regardless of where it lies.
    #[must_use]
    pub fn all(&self) -> Vec<&SpatialObject<K>> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut out);
        out
    }

    /// Drop every object and every child node.
    pub fn clear(&mut self) {
        self.root.objects.clear();
        self.root.children = None;
        self.len = 0;
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.root.accumulate(&mut stats);
        stats
    }
}

impl<K: Clone + PartialEq> Node<K> {
    fn new(bounds: Rect, depth: usize) -> Self {
        Self { bounds, depth, objects: Vec::new(), children: None }
    }

    fn insert(&mut self, obj: SpatialObject<K>, config: &SpatialConfig) {
        if let Some(children) = self.children.as_mut() {
            if let Some(idx) = quadrant_for(children, &obj.bounds) {
                children[idx].insert(obj, config);
                return;
            }
        }

        self.objects.push(obj);

        if self.objects.len() > config.max_objects && self.depth < config.max_depth {
            if self.children.is_none() {
                self.split();
            }
            self.push_down(config);
        }
    }

    fn split(&mut self) {
        let Rect { x, y, width, height } = self.bounds;
        let hw = width / 2.0;
        let hh = height / 2.0;
        let depth = self.depth + 1;
        trace!(depth, x, y, width, height, "quadtree node split");
        self.children = Some(Box::new([
            Node::new(Rect::new(x, y, hw, hh), depth),
            Node::new(Rect::new(x + hw, y, hw, hh), depth),
            Node::new(Rect::new(x, y + hh, hw, hh), depth),
            Node::new(Rect::new(x + hw, y + hh, hw, hh), depth),
        ]));
    }

    /// Move every held object that now fits one quadrant into that child.
    fn push_down(&mut self, config: &SpatialConfig) {
        let Some(children) = self.children.as_mut() else {
            return;
        };
        let held = std::mem::take(&mut self.objects);
        for obj in held {
            match quadrant_for(children, &obj.bounds) {
                Some(idx) => children[idx].insert(obj, config),
                None => self.objects.push(obj),
            }
        }
    }

    fn remove(&mut self, id: &K, hint: &Rect) -> Option<SpatialObject<K>> {
        if let Some(pos) = self.objects.iter().position(|obj| obj.id == *id) {
            return Some(self.objects.remove(pos));
        }

        let children = self.children.as_mut()?;
        let hinted = quadrant_for(children, hint);
        if let Some(idx) = hinted {
            if let Some(found) = children[idx].remove(id, hint) {
                return Some(found);
            }
        }

        // Bounds drifted since insertion: scan the remaining quadrants.
        children
            .iter_mut()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != hinted)
            .find_map(|(_, child)| child.remove(id, hint))
    }

    fn query<'a>(&'a self, area: &Rect, out: &mut Vec<&'a SpatialObject<K>>) {
        out.extend(self.objects.iter().filter(|obj| obj.bounds.intersects(area)));
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                if child.bounds.intersects(area) {
                    child.query(area, out);
                }
            }
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a SpatialObject<K>>) {
        out.extend(self.objects.iter());
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect(out);
            }
        }
    }

    fn accumulate(&self, stats: &mut TreeStats) {
        stats.node_count += 1;
        stats.object_count += self.objects.len();
        stats.max_depth = stats.max_depth.max(self.depth);
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.accumulate(stats);
            }
        }
    }
}

/// Index of the first quadrant that fully contains `rect`.
fn quadrant_for<K>(children: &[Node<K>; 4], rect: &Rect) -> Option<usize> {
    children.iter().position(|child| child.bounds.contains_rect(rect))
}
