#![allow(clippy::float_cmp)]

use super::*;
use crate::geom::Point;

fn tracker() -> DirtyRegionTracker {
    DirtyRegionTracker::new(Rect::new(0.0, 0.0, 1000.0, 1000.0), DirtyConfig::default(), SpatialConfig::default())
}

fn covered(regions: &[DirtyRegion], pt: Point) -> bool {
    regions.iter().any(|r| r.contains_point(pt))
}

// =============================================================
// Merging
// =============================================================

#[test]
fn overlapping_marks_merge_into_envelope() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    let outcome = t.mark_dirty(5.0, 5.0, 10.0, 10.0);
    assert_eq!(outcome, MarkOutcome::Merged(Rect::new(0.0, 0.0, 15.0, 15.0)));
    assert_eq!(t.get_dirty_regions(), vec![Rect::new(0.0, 0.0, 15.0, 15.0)]);
}

#[test]
fn disjoint_marks_stay_separate() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    t.mark_dirty(100.0, 100.0, 10.0, 10.0);
    assert_eq!(t.len(), 2);
    assert_eq!(t.stats().merged, 0);
}

#[test]
fn adjacent_marks_merge() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    t.mark_dirty(10.0, 0.0, 10.0, 10.0);
    assert_eq!(t.get_dirty_regions(), vec![Rect::new(0.0, 0.0, 20.0, 10.0)]);
}

#[test]
fn smallest_envelope_wins_among_candidates() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 100.0, 100.0);
    t.mark_dirty(300.0, 0.0, 10.0, 10.0);
    // Touches both; merging with the small one yields the smaller envelope.
    t.mark_dirty(95.0, 0.0, 210.0, 5.0);
    let regions = t.get_dirty_regions();
    assert_eq!(regions.len(), 2);
    assert!(regions.contains(&Rect::new(0.0, 0.0, 100.0, 100.0)));
    assert!(regions.contains(&Rect::new(95.0, 0.0, 215.0, 10.0)));
}

#[test]
fn merge_picks_one_target_only() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    t.mark_dirty(20.0, 0.0, 10.0, 10.0);
    t.mark_dirty(5.0, 0.0, 20.0, 10.0);
    assert_eq!(t.len(), 2);
    assert_eq!(t.stats().merged, 1);
}

#[test]
fn merged_region_keeps_its_age() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    t.mark_dirty(500.0, 500.0, 10.0, 10.0);
    t.mark_dirty(5.0, 5.0, 10.0, 10.0);
    assert_eq!(t.get_dirty_regions()[0], Rect::new(0.0, 0.0, 15.0, 15.0));
}

#[test]
fn empty_rect_is_ignored() {
    let mut t = tracker();
    assert_eq!(t.mark_dirty(0.0, 0.0, 0.0, 10.0), MarkOutcome::Ignored);
    assert!(!t.is_dirty());
    assert_eq!(t.stats().marked, 0);
}

// =============================================================
// Soundness
// =============================================================

#[test]
fn union_of_regions_covers_every_marked_rect() {
    let mut t = tracker();
    let mut marked = Vec::new();
    for i in 0..15_u32 {
        let x = f64::from((i * 97) % 900);
        let y = f64::from((i * 53) % 900);
        let w = f64::from(10 + (i * 7) % 40);
        let h = f64::from(10 + (i * 11) % 40);
        t.mark_dirty(x, y, w, h);
        marked.push(Rect::new(x, y, w, h));
    }
    let regions = t.get_dirty_regions();
    for r in &marked {
        for pt in [Point::new(r.x, r.y), Point::new(r.right(), r.bottom()), Point::new(r.x + r.width / 2.0, r.y)] {
            assert!(covered(&regions, pt), "{pt:?} from {r:?} not covered");
        }
    }
}

#[test]
fn merged_area_never_shrinks() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    t.mark_dirty(8.0, 8.0, 30.0, 2.0);
    assert!(t.total_area() >= 100.0);
}

// =============================================================
// Eviction / lifecycle
// =============================================================

#[test]
fn oldest_region_evicted_past_cap() {
    let mut t = tracker();
    for i in 0..21_u32 {
        t.mark_dirty(f64::from(i) * 40.0, 0.0, 10.0, 10.0);
    }
    let regions = t.get_dirty_regions();
    assert_eq!(regions.len(), 20);
    assert_eq!(regions[0].x, 40.0);
    assert_eq!(t.stats().evicted, 1);
    // Evicted region is gone from the index too: a new mark there is not a merge.
    assert!(matches!(t.mark_dirty(0.0, 0.0, 5.0, 5.0), MarkOutcome::Added(_)));
}

#[test]
fn clear_empties_list_and_index() {
    let mut t = tracker();
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    t.clear_dirty_regions();
    assert!(!t.is_dirty());
    assert_eq!(t.index_stats().object_count, 0);
    assert!(matches!(t.mark_dirty(0.0, 0.0, 10.0, 10.0), MarkOutcome::Added(_)));
}

#[test]
fn take_counts_redraws_only_when_dirty() {
    let mut t = tracker();
    assert!(t.take_dirty_regions().is_empty());
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    assert_eq!(t.take_dirty_regions().len(), 1);
    assert!(t.is_empty());
    assert_eq!(t.stats().redraws, 1);
}

#[test]
fn resize_rebuilds_index_and_keeps_regions() {
    let mut t = tracker();
    t.mark_dirty(1500.0, 1500.0, 10.0, 10.0);
    t.mark_dirty(10.0, 10.0, 10.0, 10.0);
    t.update_spatial_bounds(4000.0, 4000.0);
    assert_eq!(t.len(), 2);
    assert_eq!(t.index_stats().object_count, 2);
    let outcome = t.mark_dirty(1505.0, 1505.0, 10.0, 10.0);
    assert_eq!(outcome, MarkOutcome::Merged(Rect::new(1500.0, 1500.0, 15.0, 15.0)));
}

#[test]
fn bounding_region_spans_all() {
    let mut t = tracker();
    assert!(t.bounding_region().is_none());
    t.mark_dirty(0.0, 0.0, 10.0, 10.0);
    t.mark_dirty(90.0, 90.0, 10.0, 10.0);
    assert_eq!(t.bounding_region(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
}
