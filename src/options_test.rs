#![allow(clippy::float_cmp)]

use super::*;
use crate::paint::{Glow, Paint, Shadow};

// =============================================================
// Sizing rules
// =============================================================

#[test]
fn explicit_size_anchors_top_left() {
    let cfg = DrawConfig::at(10.0, 20.0).with_size(30.0, 40.0);
    assert_eq!(cfg.bounds(), Rect::new(10.0, 20.0, 30.0, 40.0));
}

#[test]
fn missing_dimension_defaults_to_shape_size() {
    let cfg = DrawConfig { width: Some(30.0), ..DrawConfig::at(0.0, 0.0) };
    assert_eq!(cfg.bounds(), Rect::new(0.0, 0.0, 30.0, 100.0));
}

#[test]
fn radius_centers_on_origin() {
    let cfg = DrawConfig::at(50.0, 50.0).with_radius(10.0);
    assert_eq!(cfg.bounds(), Rect::new(40.0, 40.0, 20.0, 20.0));
}

#[test]
fn explicit_size_beats_radius() {
    let cfg = DrawConfig::at(0.0, 0.0).with_size(5.0, 5.0).with_radius(50.0);
    assert_eq!(cfg.bounds(), Rect::new(0.0, 0.0, 5.0, 5.0));
}

#[test]
fn elliptical_radii() {
    let cfg = DrawConfig { radius_x: Some(20.0), radius_y: Some(10.0), ..DrawConfig::at(100.0, 100.0) };
    assert_eq!(cfg.bounds(), Rect::new(80.0, 90.0, 40.0, 20.0));
}

#[test]
fn single_elliptical_radius_is_mirrored() {
    let cfg = DrawConfig { radius_x: Some(20.0), ..DrawConfig::at(100.0, 100.0) };
    assert_eq!(cfg.bounds(), Rect::new(80.0, 80.0, 40.0, 40.0));
}

#[test]
fn points_envelope_when_unsized() {
    let cfg = DrawConfig::default().with_points(vec![Point::new(10.0, 10.0), Point::new(60.0, 30.0)]);
    assert_eq!(cfg.bounds(), Rect::new(10.0, 10.0, 50.0, 20.0));
}

#[test]
fn fallback_is_default_square() {
    assert_eq!(DrawConfig::at(7.0, 8.0).bounds(), Rect::new(7.0, 8.0, 100.0, 100.0));
}

// =============================================================
// Damage bounds
// =============================================================

#[test]
fn damage_includes_half_stroke() {
    let cfg = DrawConfig::at(10.0, 10.0)
        .with_size(10.0, 10.0)
        .with_paint(PaintState { line_width: Some(4.0), ..PaintState::default() });
    assert_eq!(cfg.damage_bounds(), Rect::new(8.0, 8.0, 14.0, 14.0));
}

#[test]
fn damage_includes_widest_shadow() {
    let paint = PaintState {
        line_width: Some(0.0),
        glow: Some(Glow { color: "gold".into(), size: 3.0 }),
        ..PaintState::default()
    };
    let overrides = PaintOverrides {
        shadow: Some(Shadow { color: "black".into(), blur: 4.0, offset_x: 2.0, offset_y: -1.0 }),
        ..PaintOverrides::default()
    };
    let cfg = DrawConfig::at(0.0, 0.0).with_size(10.0, 10.0).with_paint(paint).with_overrides(overrides);
    assert_eq!(cfg.damage_bounds(), Rect::new(-6.0, -6.0, 22.0, 22.0));
}

#[test]
fn damage_covers_points_outside_box() {
    let cfg = DrawConfig::at(0.0, 0.0)
        .with_size(10.0, 10.0)
        .with_paint(PaintState { line_width: Some(0.0), ..PaintState::default() })
        .with_points(vec![Point::new(50.0, 5.0)]);
    assert_eq!(cfg.damage_bounds(), Rect::new(0.0, 0.0, 50.0, 10.0));
}

// =============================================================
// Serde + props
// =============================================================

#[test]
fn deserializes_flat_paint_fields() {
    let cfg: DrawConfig = serde_json::from_str(
        r##"{"x": 5, "y": 6, "radius": 3, "fill": {"color": "#ff0000"}, "opacity": 0.5, "props": {"text": "hi"}}"##,
    )
    .unwrap();
    assert_eq!(cfg.paint.fill, Some(Paint::color("#ff0000")));
    assert_eq!(cfg.paint.opacity, Some(0.5));
    assert_eq!(cfg.props().text(), "hi");
    assert_eq!(cfg.bounds(), Rect::new(2.0, 3.0, 6.0, 6.0));
}

#[test]
fn props_defaults() {
    let cfg = DrawConfig::default();
    let props = cfg.props();
    assert_eq!(props.text(), "");
    assert_eq!(props.font_size(), 16.0);
    assert_eq!(props.font_family(), "sans-serif");
    assert_eq!(props.spikes(), 5);
    assert_eq!(props.inner_ratio(), 0.5);
}

#[test]
fn spikes_never_below_three() {
    let cfg = DrawConfig { props: serde_json::json!({"spikes": 1}), ..DrawConfig::default() };
    assert_eq!(cfg.props().spikes(), 3);
}

#[test]
fn spikes_capped_for_huge_values() {
    for n in [2_000u64, 3_000_000_000, u64::MAX] {
        let cfg = DrawConfig { props: serde_json::json!({"spikes": n}), ..DrawConfig::default() };
        assert_eq!(cfg.props().spikes(), crate::consts::MAX_STAR_SPIKES);
    }
}

#[test]
fn empty_overrides_are_inactive() {
    let cfg = DrawConfig::default().with_overrides(PaintOverrides::default());
    assert!(cfg.active_overrides().is_none());
}

#[test]
fn offset_moves_origin_and_points() {
    let cfg = DrawConfig::at(1.0, 2.0).with_points(vec![Point::new(3.0, 4.0)]).offset(10.0, 20.0);
    assert_eq!((cfg.x, cfg.y), (11.0, 22.0));
    assert_eq!(cfg.points, vec![Point::new(13.0, 24.0)]);
}
