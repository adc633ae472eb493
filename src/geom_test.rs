#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Rect predicates
// =============================================================

#[test]
fn intersects_overlapping() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
}

#[test]
fn intersects_shared_edge_counts() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(&b));
}

#[test]
fn intersects_shared_corner_counts() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.0, 10.0, 5.0, 5.0);
    assert!(a.intersects(&b));
}

#[test]
fn intersects_disjoint() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.5, 0.0, 10.0, 10.0);
    assert!(!a.intersects(&b));
}

#[test]
fn contains_point_is_edge_inclusive() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert!(r.contains_point(Point::new(10.0, 10.0)));
    assert!(r.contains_point(Point::new(30.0, 30.0)));
    assert!(r.contains_point(Point::new(20.0, 30.0)));
    assert!(!r.contains_point(Point::new(9.0, 10.0)));
    assert!(!r.contains_point(Point::new(30.1, 20.0)));
}

#[test]
fn contains_rect_inside_and_straddling() {
    let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert!(outer.contains_rect(&Rect::new(0.0, 0.0, 100.0, 100.0)));
    assert!(outer.contains_rect(&Rect::new(10.0, 10.0, 5.0, 5.0)));
    assert!(!outer.contains_rect(&Rect::new(90.0, 90.0, 20.0, 5.0)));
}

#[test]
fn union_covers_both() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 15.0));
}

#[test]
fn empty_rect_detection() {
    assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
    assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_empty());
    assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
}

#[test]
fn translate_moves_origin_only() {
    let r = Rect::new(1.0, 2.0, 3.0, 4.0).translate(10.0, 20.0);
    assert_eq!(r, Rect::new(11.0, 22.0, 3.0, 4.0));
}

#[test]
fn point_distance() {
    assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
}

#[test]
fn inflate_grows_every_side() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0).inflate(2.5);
    assert_eq!(r, Rect::new(7.5, 7.5, 25.0, 25.0));
}

#[test]
fn enclosing_points() {
    assert!(Rect::enclosing(&[]).is_none());
    let r = Rect::enclosing(&[Point::new(5.0, 1.0), Point::new(-2.0, 8.0), Point::new(3.0, 3.0)]);
    assert_eq!(r, Some(Rect::new(-2.0, 1.0, 7.0, 7.0)));
}
