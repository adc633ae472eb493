//! Built-in shape tools.
//!
//! Every tool is generic over [`RasterContext`], so the same routines drive
//! the browser context and the recording host. Tools only build geometry and
//! paint it: fill and stroke styles, opacity, blend and shadow are already
//! applied by the batcher when a tool runs.
//!
//! A closed shape is filled when a fill is set (or when neither fill nor
//! stroke is, so a bare shape still shows up) and stroked when a stroke is
//! set. Lines, arrows and curves are always stroked.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use drawkit::error::ContextError;
use drawkit::geom::Point;
use drawkit::options::DrawConfig;
use drawkit::raster::RasterContext;
use drawkit::registry::{ShapeKind, ToolRegistry};

use crate::consts::{ARROW_HEAD_ANGLE, STAR_START_ANGLE, TEXT_BASELINE, TEXT_LINE_HEIGHT};

/// Register every built-in tool. Existing entries for the same kinds are replaced.
pub fn register_builtin_tools<C: RasterContext + 'static>(registry: &mut ToolRegistry<C>) {
    registry.register(ShapeKind::Rect, draw_rect::<C>);
    registry.register(ShapeKind::Circle, draw_circle::<C>);
    registry.register(ShapeKind::Ellipse, draw_ellipse::<C>);
    registry.register(ShapeKind::Diamond, draw_diamond::<C>);
    registry.register(ShapeKind::Star, draw_star::<C>);
    registry.register(ShapeKind::Polygon, draw_polygon::<C>);
    registry.register(ShapeKind::Line, draw_line::<C>);
    registry.register(ShapeKind::Arrow, draw_arrow::<C>);
    registry.register(ShapeKind::Bezier, draw_bezier::<C>);
    registry.register(ShapeKind::Text, draw_text::<C>);
}

// =============================================================
// Closed shapes
// =============================================================

/// Axis-aligned rectangle over the shape's bounds.
///
/// # Errors
///
/// Returns `Err` if the host rejects the rotation transform.
pub fn draw_rect<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    rotated(ctx, cfg, |ctx| {
        let b = cfg.bounds();
        if fills(cfg) {
            ctx.fill_rect(b.x, b.y, b.width, b.height);
        }
        if strokes(cfg) {
            ctx.stroke_rect(b.x, b.y, b.width, b.height);
        }
        Ok(())
    })
}

/// Circle of `radius` around `(x, y)`, or inscribed in the bounds when no radius is set.
///
/// # Errors
///
/// Returns `Err` if the host rejects the arc.
pub fn draw_circle<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    let b = cfg.bounds();
    let c = cfg.center();
    let radius = cfg.radius.unwrap_or(b.width.min(b.height) / 2.0);
    ctx.begin_path();
    ctx.arc(c.x, c.y, radius.max(0.0), 0.0, std::f64::consts::TAU)?;
    paint_closed(ctx, cfg);
    Ok(())
}

/// Ellipse inscribed in the bounds, rotated by `rotation`.
///
/// # Errors
///
/// Returns `Err` if the host rejects the ellipse.
pub fn draw_ellipse<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    let b = cfg.bounds();
    if b.width <= 0.0 || b.height <= 0.0 {
        return Ok(());
    }
    let c = cfg.center();
    ctx.begin_path();
    ctx.ellipse(c.x, c.y, b.width / 2.0, b.height / 2.0, cfg.rotation)?;
    paint_closed(ctx, cfg);
    Ok(())
}

/// Rhombus touching the midpoints of the bounds' edges.
///
/// # Errors
///
/// Returns `Err` if the host rejects the rotation transform.
pub fn draw_diamond<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    rotated(ctx, cfg, |ctx| {
        let b = cfg.bounds();
        let c = cfg.center();
        ctx.begin_path();
        ctx.move_to(c.x, b.y);
        ctx.line_to(b.right(), c.y);
        ctx.line_to(c.x, b.bottom());
        ctx.line_to(b.x, c.y);
        ctx.close_path();
        paint_closed(ctx, cfg);
        Ok(())
    })
}

/// Star with `spikes` outer points inscribed in the bounds.
///
/// # Errors
///
/// Returns `Err` if the host rejects the rotation transform.
#[allow(clippy::similar_names)]
pub fn draw_star<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    let b = cfg.bounds();
    if b.width <= 0.0 || b.height <= 0.0 {
        return Ok(());
    }
    rotated(ctx, cfg, |ctx| {
        let props = cfg.props();
        let c = cfg.center();
        let (rx_outer, ry_outer) = (b.width / 2.0, b.height / 2.0);
        let ratio = props.inner_ratio();
        let spikes = props.spikes();
        let vertices = spikes.saturating_mul(2);
        let step = std::f64::consts::PI / f64::from(spikes);

        ctx.begin_path();
        for i in 0..vertices {
            let angle = step.mul_add(f64::from(i), STAR_START_ANGLE);
            let (rx, ry) = if i % 2 == 0 {
                (rx_outer, ry_outer)
            } else {
                (rx_outer * ratio, ry_outer * ratio)
            };
            let (px, py) = (rx.mul_add(angle.cos(), c.x), ry.mul_add(angle.sin(), c.y));
            if i == 0 {
                ctx.move_to(px, py);
            } else {
                ctx.line_to(px, py);
            }
        }
        ctx.close_path();
        paint_closed(ctx, cfg);
        Ok(())
    })
}

/// Closed polygon through `points`. Fewer than three points draw nothing.
///
/// # Errors
///
/// Infallible today; returns `Result` to match the tool signature.
pub fn draw_polygon<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    if cfg.points.len() < 3 {
        return Ok(());
    }
    trace_points(ctx, &cfg.points);
    ctx.close_path();
    paint_closed(ctx, cfg);
    Ok(())
}

// =============================================================
// Open shapes
// =============================================================

/// Polyline through `points`.
///
/// # Errors
///
/// Infallible today; returns `Result` to match the tool signature.
pub fn draw_line<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    if cfg.points.len() < 2 {
        return Ok(());
    }
    trace_points(ctx, &cfg.points);
    ctx.stroke();
    Ok(())
}

/// Polyline with a filled head at the last point, aligned with the last segment.
///
/// # Errors
///
/// Infallible today; returns `Result` to match the tool signature.
pub fn draw_arrow<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    let [.., from, tip] = cfg.points.as_slice() else {
        return Ok(());
    };
    draw_line(ctx, cfg)?;

    let size = cfg.props().head_size();
    let angle = (tip.y - from.y).atan2(tip.x - from.x);
    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(
        size.mul_add(-(angle - ARROW_HEAD_ANGLE).cos(), tip.x),
        size.mul_add(-(angle - ARROW_HEAD_ANGLE).sin(), tip.y),
    );
    ctx.line_to(
        size.mul_add(-(angle + ARROW_HEAD_ANGLE).cos(), tip.x),
        size.mul_add(-(angle + ARROW_HEAD_ANGLE).sin(), tip.y),
    );
    ctx.close_path();
    ctx.fill();
    Ok(())
}

/// Cubic bezier chain: the first point, then `(control, control, end)` triples.
/// An incomplete trailing triple is ignored.
///
/// # Errors
///
/// Infallible today; returns `Result` to match the tool signature.
pub fn draw_bezier<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    let Some((start, rest)) = cfg.points.split_first() else {
        return Ok(());
    };
    if rest.len() < 3 {
        return Ok(());
    }
    ctx.begin_path();
    ctx.move_to(start.x, start.y);
    for seg in rest.chunks_exact(3) {
        ctx.bezier_curve_to(seg[0].x, seg[0].y, seg[1].x, seg[1].y, seg[2].x, seg[2].y);
    }
    ctx.stroke();
    Ok(())
}

// =============================================================
// Text
// =============================================================

/// `props.text` at `(x, y)`, one line per `\n`.
///
/// # Errors
///
/// Returns `Err` if the host rejects a `fillText` call.
pub fn draw_text<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) -> Result<(), ContextError> {
    let props = cfg.props();
    let text = props.text();
    if text.is_empty() {
        return Ok(());
    }
    let size = props.font_size();
    ctx.set_font(&format!("{size}px {}", props.font_family()));
    ctx.set_text_align(props.text_align());
    ctx.set_text_baseline(TEXT_BASELINE);

    let mut y = cfg.y;
    for line in text.lines() {
        ctx.fill_text(line, cfg.x, y)?;
        y += size * TEXT_LINE_HEIGHT;
    }
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn fills(cfg: &DrawConfig) -> bool {
    cfg.paint.fill.is_some() || cfg.active_overrides().is_some_and(|o| o.fill.is_some()) || !strokes(cfg)
}

fn strokes(cfg: &DrawConfig) -> bool {
    cfg.paint.stroke.is_some() || cfg.active_overrides().is_some_and(|o| o.stroke.is_some())
}

fn paint_closed<C: RasterContext>(ctx: &mut C, cfg: &DrawConfig) {
    if fills(cfg) {
        ctx.fill();
    }
    if strokes(cfg) {
        ctx.stroke();
    }
}

fn trace_points<C: RasterContext>(ctx: &mut C, points: &[Point]) {
    ctx.begin_path();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            ctx.move_to(p.x, p.y);
        } else {
            ctx.line_to(p.x, p.y);
        }
    }
}

/// Run `draw` with the context rotated by `cfg.rotation` about the shape's center.
fn rotated<C, F>(ctx: &mut C, cfg: &DrawConfig, draw: F) -> Result<(), ContextError>
where
    C: RasterContext,
    F: FnOnce(&mut C) -> Result<(), ContextError>,
{
    if cfg.rotation.abs() < f64::EPSILON {
        return draw(ctx);
    }
    let c = cfg.center();
    ctx.save();
    let result = ctx
        .translate(c.x, c.y)
        .and_then(|()| ctx.rotate(cfg.rotation))
        .and_then(|()| ctx.translate(-c.x, -c.y))
        .and_then(|()| draw(ctx));
    ctx.restore();
    result
}
