#![allow(clippy::float_cmp)]

use std::rc::Rc;

use drawkit::clock::ManualClock;
use drawkit::config::EngineConfig;
use drawkit::engine::Engine;
use drawkit::geom::Rect;
use drawkit::headless::{Command, MarkKind, RecordingContext, RecordingFactory};
use drawkit::interactive::{Handlers, LayoutContext};
use drawkit::paint::{Paint, PaintState};

use super::*;

fn run(tool: fn(&mut RecordingContext, &DrawConfig) -> Result<(), ContextError>, cfg: &DrawConfig) -> RecordingContext {
    let mut ctx = RecordingContext::new();
    tool(&mut ctx, cfg).unwrap();
    ctx
}

fn stroked() -> PaintState {
    PaintState { stroke: Some(Paint::color("black")), ..PaintState::default() }
}

fn filled_and_stroked() -> PaintState {
    PaintState { fill: Some(Paint::color("red")), ..stroked() }
}

fn count(ctx: &RecordingContext, pred: impl Fn(&Command) -> bool) -> usize {
    ctx.commands().iter().filter(|c| pred(c)).count()
}

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

// =============================================================
// Registration
// =============================================================

#[test]
fn builtins_cover_every_drawable_kind() {
    let mut registry: ToolRegistry<RecordingContext> = ToolRegistry::new();
    register_builtin_tools(&mut registry);

    assert_eq!(registry.len(), 10);
    for kind in ["rect", "circle", "ellipse", "diamond", "star", "polygon", "line", "arrow", "bezier", "text"] {
        assert!(registry.has(&ShapeKind::from(kind)), "missing {kind}");
    }
    assert!(!registry.has(&ShapeKind::Image));
}

// =============================================================
// Closed shapes
// =============================================================

#[test]
fn bare_rect_is_filled() {
    let ctx = run(draw_rect, &DrawConfig::at(10.0, 20.0).with_size(30.0, 40.0));
    assert_eq!(ctx.marks().len(), 1);
    assert_eq!(ctx.marks()[0].kind, MarkKind::Fill);
    assert_eq!(ctx.marks()[0].bounds, Rect::new(10.0, 20.0, 30.0, 40.0));
}

#[test]
fn stroke_only_rect_is_not_filled() {
    let cfg = DrawConfig::at(0.0, 0.0).with_size(10.0, 10.0).with_paint(stroked());
    let ctx = run(draw_rect, &cfg);
    let kinds: Vec<_> = ctx.marks().iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MarkKind::Stroke]);
}

#[test]
fn filled_and_stroked_rect_paints_both() {
    let cfg = DrawConfig::at(0.0, 0.0).with_size(10.0, 10.0).with_paint(filled_and_stroked());
    let ctx = run(draw_rect, &cfg);
    let kinds: Vec<_> = ctx.marks().iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MarkKind::Fill, MarkKind::Stroke]);
}

#[test]
fn rotated_rect_turns_about_center() {
    let cfg = DrawConfig { rotation: 0.5, ..DrawConfig::at(0.0, 0.0).with_size(20.0, 10.0) };
    let ctx = run(draw_rect, &cfg);
    assert_eq!(
        &ctx.commands()[..4],
        &[
            Command::Save,
            Command::Translate(Point::new(10.0, 5.0)),
            Command::Rotate(0.5),
            Command::Translate(Point::new(-10.0, -5.0)),
        ]
    );
    assert_eq!(ctx.commands().last(), Some(&Command::Restore));
}

#[test]
fn circle_uses_radius_around_origin() {
    let ctx = run(draw_circle, &DrawConfig::at(50.0, 50.0).with_radius(10.0));
    assert!(ctx.commands().contains(&Command::Arc { center: Point::new(50.0, 50.0), radius: 10.0 }));
    assert_eq!(ctx.marks()[0].bounds, Rect::new(40.0, 40.0, 20.0, 20.0));
}

#[test]
fn circle_without_radius_is_inscribed() {
    let ctx = run(draw_circle, &DrawConfig::at(0.0, 0.0).with_size(40.0, 20.0));
    assert!(ctx.commands().contains(&Command::Arc { center: Point::new(20.0, 10.0), radius: 10.0 }));
}

#[test]
fn ellipse_inscribed_in_bounds() {
    let ctx = run(draw_ellipse, &DrawConfig::at(0.0, 0.0).with_size(40.0, 20.0));
    assert!(ctx.commands().contains(&Command::Ellipse {
        center: Point::new(20.0, 10.0),
        radius_x: 20.0,
        radius_y: 10.0,
    }));
}

#[test]
fn degenerate_ellipse_draws_nothing() {
    let ctx = run(draw_ellipse, &DrawConfig::at(0.0, 0.0).with_size(0.0, 20.0));
    assert!(ctx.commands().is_empty());
}

#[test]
fn diamond_touches_edge_midpoints() {
    let ctx = run(draw_diamond, &DrawConfig::at(0.0, 0.0).with_size(20.0, 10.0));
    assert_eq!(ctx.marks()[0].bounds, Rect::new(0.0, 0.0, 20.0, 10.0));
    assert!(ctx.commands().contains(&Command::MoveTo(Point::new(10.0, 0.0))));
    assert!(ctx.commands().contains(&Command::LineTo(Point::new(20.0, 5.0))));
}

#[test]
fn star_has_two_vertices_per_spike() {
    let ctx = run(draw_star, &DrawConfig::at(0.0, 0.0).with_size(100.0, 100.0));
    assert_eq!(count(&ctx, |c| matches!(c, Command::MoveTo(_))), 1);
    assert_eq!(count(&ctx, |c| matches!(c, Command::LineTo(_))), 9);

    let seven = DrawConfig { props: serde_json::json!({"spikes": 7}), ..DrawConfig::at(0.0, 0.0).with_size(100.0, 100.0) };
    let ctx = run(draw_star, &seven);
    assert_eq!(count(&ctx, |c| matches!(c, Command::LineTo(_))), 13);
}

#[test]
fn star_with_huge_spike_count_is_capped() {
    let cfg = DrawConfig { props: serde_json::json!({"spikes": 3_000_000_000u64}), ..DrawConfig::at(0.0, 0.0).with_size(100.0, 100.0) };
    let ctx = run(draw_star, &cfg);
    let max = usize::try_from(drawkit::consts::MAX_STAR_SPIKES).unwrap();
    assert_eq!(count(&ctx, |c| matches!(c, Command::MoveTo(_))), 1);
    assert_eq!(count(&ctx, |c| matches!(c, Command::LineTo(_))), max * 2 - 1);
}

#[test]
fn star_first_spike_points_up() {
    let ctx = run(draw_star, &DrawConfig::at(0.0, 0.0).with_size(100.0, 100.0));
    let Some(Command::MoveTo(first)) = ctx.commands().iter().find(|c| matches!(c, Command::MoveTo(_))) else {
        panic!("star path has no start");
    };
    assert!((first.x - 50.0).abs() < 1e-9);
    assert!(first.y.abs() < 1e-9);
}

#[test]
fn polygon_needs_three_points() {
    let two = DrawConfig::default().with_points(pts(&[(0.0, 0.0), (10.0, 0.0)]));
    assert!(run(draw_polygon, &two).commands().is_empty());

    let three = DrawConfig::default().with_points(pts(&[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)]));
    let ctx = run(draw_polygon, &three);
    assert!(ctx.commands().contains(&Command::ClosePath));
    assert_eq!(ctx.marks()[0].bounds, Rect::new(0.0, 0.0, 10.0, 8.0));
}

// =============================================================
// Open shapes
// =============================================================

#[test]
fn line_is_stroked_through_points() {
    let cfg = DrawConfig::default().with_points(pts(&[(0.0, 0.0), (30.0, 10.0), (60.0, 0.0)]));
    let ctx = run(draw_line, &cfg);
    assert_eq!(ctx.marks().len(), 1);
    assert_eq!(ctx.marks()[0].kind, MarkKind::Stroke);
    assert_eq!(ctx.marks()[0].bounds, Rect::new(0.0, 0.0, 60.0, 10.0));
}

#[test]
fn line_needs_two_points() {
    let cfg = DrawConfig::default().with_points(pts(&[(0.0, 0.0)]));
    assert!(run(draw_line, &cfg).commands().is_empty());
}

#[test]
fn arrow_adds_filled_head_at_tip() {
    let cfg = DrawConfig::default().with_points(pts(&[(0.0, 0.0), (100.0, 0.0)]));
    let ctx = run(draw_arrow, &cfg);
    let kinds: Vec<_> = ctx.marks().iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MarkKind::Stroke, MarkKind::Fill]);

    let head = ctx.marks()[1].bounds;
    assert!((head.right() - 100.0).abs() < 1e-9);
    assert!(head.x < 100.0 && head.x > 85.0);
}

#[test]
fn bezier_ignores_incomplete_segment() {
    let cfg = DrawConfig::default().with_points(pts(&[
        (0.0, 0.0),
        (10.0, 20.0),
        (20.0, 20.0),
        (30.0, 0.0),
        (40.0, 10.0),
    ]));
    let ctx = run(draw_bezier, &cfg);
    assert_eq!(count(&ctx, |c| matches!(c, Command::BezierCurveTo(_))), 1);
    assert_eq!(count(&ctx, |c| matches!(c, Command::Stroke)), 1);
}

// =============================================================
// Text
// =============================================================

#[test]
fn text_draws_one_call_per_line() {
    let cfg = DrawConfig { props: serde_json::json!({"text": "one\ntwo"}), ..DrawConfig::at(5.0, 10.0) };
    let ctx = run(draw_text, &cfg);

    assert!(ctx.commands().contains(&Command::Font("16px sans-serif".into())));
    assert!(ctx.commands().contains(&Command::TextBaseline("top".into())));
    assert!(ctx.commands().contains(&Command::FillText { text: "one".into(), at: Point::new(5.0, 10.0) }));
    assert!(ctx.commands().contains(&Command::FillText { text: "two".into(), at: Point::new(5.0, 30.0) }));
}

#[test]
fn empty_text_draws_nothing() {
    assert!(run(draw_text, &DrawConfig::at(0.0, 0.0)).commands().is_empty());
}

// =============================================================
// Through the engine
// =============================================================

#[test]
fn engine_renders_builtin_shapes() {
    let clock = ManualClock::new();
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry);
    let mut engine = Engine::new(RecordingFactory::new(), registry, EngineConfig::default(), Rc::new(clock), 400, 300);
    let root = LayoutContext::new("root", 0.0, 0.0);

    engine
        .draw("a", ShapeKind::Rect, DrawConfig::at(0.0, 0.0).with_size(10.0, 10.0), &root, Handlers::new())
        .unwrap();
    engine
        .draw("b", ShapeKind::Star, DrawConfig::at(50.0, 50.0).with_size(40.0, 40.0), &root, Handlers::new())
        .unwrap();
    engine
        .draw(
            "c",
            ShapeKind::Line,
            DrawConfig::default().with_points(pts(&[(0.0, 100.0), (100.0, 100.0)])),
            &root,
            Handlers::new(),
        )
        .unwrap();

    let frame = engine.render().unwrap();
    assert_eq!(frame.report.executed, 3);
    assert_eq!(frame.report.failed, 0);
}
