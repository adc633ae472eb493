//! Dirty-region tracking.
//!
//! DESIGN
//! ======
//! Regions live in a FIFO list (for age-ordered eviction) mirrored by a
//! quadtree (for finding merge candidates without scanning the list). A new
//! rectangle that touches existing regions is merged into exactly one of
//! them: the candidate whose bounding envelope with the new rectangle has the
//! smallest area. Merging never cascades; the grown region may now overlap a
//! neighbour, which only costs some redundant redraw.
//!
//! TRADE-OFFS
//! ==========
//! Merges are bounding envelopes, so they over-cover but never under-cover.
//! Past `max_regions` the oldest region is dropped: its pixels will not be
//! redrawn by a partial pass. A full composite is always correct, so the
//! bounded memory is worth the occasional stale area.

#[cfg(test)]
#[path = "dirty_test.rs"]
mod dirty_test;

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::config::{DirtyConfig, SpatialConfig};
use crate::geom::Rect;
use crate::metrics::DirtyStats;
use crate::spatial::{QuadTree, SpatialObject, TreeStats};

/// A rectangle whose rendered content is stale.
pub type DirtyRegion = Rect;

type RegionId = u64;

/// What [`DirtyRegionTracker::mark_dirty`] did with a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkOutcome {
    /// Zero or negative area; nothing tracked.
    Ignored,
    /// Tracked as a new region.
    Added(DirtyRegion),
    /// Folded into an existing region, which now has these bounds.
    Merged(DirtyRegion),
}

#[derive(Debug)]
pub struct DirtyRegionTracker {
    regions: VecDeque<(RegionId, Rect)>,
    index: QuadTree<RegionId>,
    next_id: RegionId,
    config: DirtyConfig,
    stats: DirtyStats,
}

impl DirtyRegionTracker {
    /// Create a tracker whose index covers `bounds`.
    #[must_use]
    pub fn new(bounds: Rect, config: DirtyConfig, spatial: SpatialConfig) -> Self {
        Self {
            regions: VecDeque::new(),
            index: QuadTree::new(bounds, spatial),
            next_id: 0,
            config,
            stats: DirtyStats::default(),
        }
    }

    /// Record that `(x, y, width, height)` needs to be redrawn.
    pub fn mark_dirty(&mut self, x: f64, y: f64, width: f64, height: f64) -> MarkOutcome {
        let rect = Rect::new(x, y, width, height);
        if rect.is_empty() {
            trace!(x, y, width, height, "ignoring empty dirty rect");
            return MarkOutcome::Ignored;
        }
        self.stats.marked += 1;

        let best = self
            .index
            .query(&rect)
            .into_iter()
            .map(|existing| (existing.id, existing.bounds, existing.bounds.union(&rect)))
            .min_by(|a, b| a.2.area().total_cmp(&b.2.area()));

        if let Some((id, old, merged)) = best {
            self.index.remove(&id, &old);
            self.index.insert(SpatialObject::new(id, merged));
            if let Some(slot) = self.regions.iter_mut().find(|(rid, _)| *rid == id) {
                slot.1 = merged;
            }
            self.stats.merged += 1;
            trace!(?merged, "dirty region merged");
            return MarkOutcome::Merged(merged);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.regions.push_back((id, rect));
        self.index.insert(SpatialObject::new(id, rect));

        if self.regions.len() > self.config.max_regions {
            if let Some((old_id, old)) = self.regions.pop_front() {
                self.index.remove(&old_id, &old);
                self.stats.evicted += 1;
                debug!(?old, max_regions = self.config.max_regions, "dirty region evicted");
            }
        }

        MarkOutcome::Added(rect)
    }

    /// Current regions, oldest first.
    #[must_use]
    pub fn get_dirty_regions(&self) -> Vec<DirtyRegion> {
        self.regions.iter().map(|(_, r)| *r).collect()
    }

    /// Forget every region and empty the index.
    pub fn clear_dirty_regions(&mut self) {
        self.regions.clear();
        self.index.clear();
    }

    /// Snapshot and clear in one step; counts as a redraw when non-empty.
    pub fn take_dirty_regions(&mut self) -> Vec<DirtyRegion> {
        let regions = self.get_dirty_regions();
        if !regions.is_empty() {
            self.stats.redraws += 1;
        }
        self.clear_dirty_regions();
        regions
    }

    /// Rebuild the index for new outer bounds; the root of a quadtree is fixed at construction.
    pub fn update_spatial_bounds(&mut self, width: f64, height: f64) {
        let spatial = self.index.config();
        let mut index = QuadTree::new(Rect::new(0.0, 0.0, width, height), spatial);
        for (id, rect) in &self.regions {
            index.insert(SpatialObject::new(*id, *rect));
        }
        self.index = index;
        debug!(width, height, regions = self.regions.len(), "dirty index rebuilt");
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.regions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Sum of region areas (overlaps counted twice).
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.regions.iter().map(|(_, r)| r.area()).sum()
    }

    /// Envelope of every region, if any.
    #[must_use]
    pub fn bounding_region(&self) -> Option<DirtyRegion> {
        self.regions.iter().map(|(_, r)| *r).reduce(|acc, r| acc.union(&r))
    }

    #[must_use]
    pub fn stats(&self) -> DirtyStats {
        self.stats
    }

    #[must_use]
    pub fn index_stats(&self) -> TreeStats {
        self.index.stats()
    }
}
