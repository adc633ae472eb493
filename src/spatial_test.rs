use super::*;

// =============================================================
// Helpers
// =============================================================

fn tree() -> QuadTree<u32> {
    QuadTree::new(Rect::new(0.0, 0.0, 1000.0, 1000.0), SpatialConfig::default())
}

fn obj(id: u32, x: f64, y: f64, w: f64, h: f64) -> SpatialObject<u32> {
    SpatialObject::new(id, Rect::new(x, y, w, h))
}

fn sorted_ids(found: &[&SpatialObject<u32>]) -> Vec<u32> {
    let mut ids: Vec<u32> = found.iter().map(|o| o.id).collect();
    ids.sort_unstable();
    ids
}

/// Small objects scattered across the whole surface.
fn scatter(count: u32) -> Vec<SpatialObject<u32>> {
    (0..count)
        .map(|i| {
            let x = f64::from((i * 137) % 980);
            let y = f64::from((i * 311) % 980);
            obj(i, x, y, 10.0, 10.0)
        })
        .collect()
}

// =============================================================
// Insert / query
// =============================================================

#[test]
fn empty_tree_has_single_node() {
    let t = tree();
    assert!(t.is_empty());
    assert_eq!(t.stats(), TreeStats { node_count: 1, object_count: 0, max_depth: 0 });
}

#[test]
fn fifteen_objects_split_and_remain_queryable() {
    let mut t = tree();
    for o in scatter(15) {
        t.insert(o);
    }
    let found = t.query(&t.bounds());
    assert_eq!(found.len(), 15);
    assert_eq!(sorted_ids(&found), (0..15).collect::<Vec<_>>());
    assert!(t.stats().node_count > 1, "a split should have occurred");
}

#[test]
fn no_split_at_exact_capacity() {
    let mut t = tree();
    for o in scatter(10) {
        t.insert(o);
    }
    assert_eq!(t.stats().node_count, 1);
}

#[test]
fn straddling_object_stays_at_root() {
    let mut t = tree();
    for o in scatter(11) {
        t.insert(o);
    }
    // Crosses both midlines.
    t.insert(obj(99, 490.0, 490.0, 20.0, 20.0));
    assert_eq!(t.root.objects.iter().filter(|o| o.id == 99).count(), 1);
    assert_eq!(t.query(&Rect::new(500.0, 500.0, 1.0, 1.0)).iter().filter(|o| o.id == 99).count(), 1);
}

#[test]
fn objects_never_duplicated_across_nodes() {
    let mut t = tree();
    for o in scatter(200) {
        t.insert(o);
    }
    let stats = t.stats();
    assert_eq!(stats.object_count, 200);
    assert_eq!(t.all().len(), 200);
    assert_eq!(t.len(), 200);
}

#[test]
fn depth_never_exceeds_max() {
    let mut t = tree();
    // Identical tiny rects in one corner keep pushing down.
    for i in 0..100 {
        t.insert(obj(i, 1.0, 1.0, 1.0, 1.0));
    }
    assert!(t.stats().max_depth <= SpatialConfig::default().max_depth);
    assert_eq!(t.query(&Rect::new(0.0, 0.0, 5.0, 5.0)).len(), 100);
}

#[test]
fn query_returns_only_intersecting() {
    let mut t = tree();
    t.insert(obj(1, 0.0, 0.0, 10.0, 10.0));
    t.insert(obj(2, 100.0, 100.0, 10.0, 10.0));
    t.insert(obj(3, 900.0, 900.0, 10.0, 10.0));
    let found = t.query(&Rect::new(5.0, 5.0, 100.0, 100.0));
    assert_eq!(sorted_ids(&found), vec![1, 2]);
}

#[test]
fn query_edge_touch_counts_as_intersecting() {
    let mut t = tree();
    t.insert(obj(1, 0.0, 0.0, 10.0, 10.0));
    assert_eq!(t.query(&Rect::new(10.0, 10.0, 5.0, 5.0)).len(), 1);
}

#[test]
fn object_outside_root_is_still_found() {
    let mut t = tree();
    for o in scatter(20) {
        t.insert(o);
    }
    t.insert(obj(500, -50.0, -50.0, 20.0, 20.0));
    let found = t.query(&Rect::new(-100.0, -100.0, 60.0, 60.0));
    assert_eq!(sorted_ids(&found), vec![500]);
}

// =============================================================
// Point queries
// =============================================================

#[test]
fn query_point_inclusive_bounds() {
    let mut t = tree();
    t.insert(obj(7, 10.0, 10.0, 20.0, 20.0));
    for (x, y) in [(10.0, 10.0), (30.0, 30.0), (20.0, 20.0), (10.0, 30.0)] {
        assert_eq!(t.query_point(Point::new(x, y)).len(), 1, "({x},{y}) should hit");
    }
    assert!(t.query_point(Point::new(9.0, 10.0)).is_empty());
    assert!(t.query_point(Point::new(30.5, 10.0)).is_empty());
}

#[test]
fn query_point_matches_brute_force() {
    let mut t = tree();
    let objects = scatter(120);
    for o in objects.clone() {
        t.insert(o);
    }
    for px in (0..1000).step_by(37) {
        for py in (0..1000).step_by(41) {
            let pt = Point::new(f64::from(px), f64::from(py));
            let expected: Vec<u32> = {
                let mut v: Vec<u32> = objects.iter().filter(|o| o.bounds.contains_point(pt)).map(|o| o.id).collect();
                v.sort_unstable();
                v
            };
            assert_eq!(sorted_ids(&t.query_point(pt)), expected, "point ({px},{py})");
        }
    }
}

// =============================================================
// Remove / clear
// =============================================================

#[test]
fn remove_by_id_with_original_bounds() {
    let mut t = tree();
    let objects = scatter(50);
    for o in objects.clone() {
        t.insert(o);
    }
    for o in objects.iter().filter(|o| o.id % 2 == 0) {
        assert!(t.remove(&o.id, &o.bounds).is_some());
    }
    let remaining = sorted_ids(&t.query(&t.bounds()));
    assert_eq!(remaining, (0..50).filter(|i| i % 2 == 1).collect::<Vec<_>>());
    assert_eq!(t.len(), 25);
}

#[test]
fn remove_with_stale_hint_falls_back_to_scan() {
    let mut t = tree();
    for o in scatter(40) {
        t.insert(o);
    }
    t.insert(obj(77, 900.0, 900.0, 5.0, 5.0));
    // Hint points at the opposite quadrant.
    let removed = t.remove(&77, &Rect::new(1.0, 1.0, 1.0, 1.0));
    assert_eq!(removed.map(|o| o.id), Some(77));
    assert!(t.query(&Rect::new(900.0, 900.0, 5.0, 5.0)).iter().all(|o| o.id != 77));
}

#[test]
fn remove_missing_returns_none() {
    let mut t = tree();
    t.insert(obj(1, 0.0, 0.0, 1.0, 1.0));
    assert!(t.remove(&2, &Rect::new(0.0, 0.0, 1.0, 1.0)).is_none());
    assert_eq!(t.len(), 1);
}

#[test]
fn interleaved_insert_remove_stays_complete() {
    let mut t = tree();
    let mut live = Vec::new();
    for (step, o) in scatter(300).into_iter().enumerate() {
        t.insert(o.clone());
        live.push(o);
        if step % 3 == 2 {
            let gone = live.remove(step % live.len());
            assert!(t.remove(&gone.id, &gone.bounds).is_some());
        }
    }
    let mut expected: Vec<u32> = live.iter().map(|o| o.id).collect();
    expected.sort_unstable();
    assert_eq!(sorted_ids(&t.query(&t.bounds())), expected);
    assert_eq!(t.stats().object_count, live.len());
}

#[test]
fn clear_discards_children() {
    let mut t = tree();
    for o in scatter(60) {
        t.insert(o);
    }
    t.clear();
    assert!(t.is_empty());
    assert_eq!(t.stats(), TreeStats { node_count: 1, object_count: 0, max_depth: 0 });
    assert!(t.query(&t.bounds()).is_empty());
}

#[test]
fn string_keys_supported() {
    let mut t: QuadTree<String> = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0), SpatialConfig::default());
    t.insert(SpatialObject::new("button".to_owned(), Rect::new(1.0, 1.0, 10.0, 10.0)));
    let hit = t.query_point(Point::new(5.0, 5.0));
    assert_eq!(hit[0].id, "button");
}
