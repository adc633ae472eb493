//! Per-shape draw options.
//!
//! [`DrawConfig`] is what a caller hands to `queue` / `draw`: geometry, the
//! paint state used for batching, optional per-operation overrides, and an
//! open-ended `props` bag for tool-specific settings (text, font, star
//! spikes). Typed access to `props` goes through [`Props`].
//!
//! Sizing rules, first match wins:
//!
//! | Fields present            | Bounds                                   |
//! |---------------------------|------------------------------------------|
//! | `width` and/or `height`   | top-left at `(x, y)`, missing side = 100 |
//! | `radius`                  | `2r x 2r` centered on `(x, y)`           |
//! | `radius_x` / `radius_y`   | `2rx x 2ry` centered on `(x, y)`         |
//! | `points`                  | envelope of the points                   |
//! | nothing                   | `100 x 100` at `(x, y)`                  |

#[cfg(test)]
#[path = "options_test.rs"]
mod options_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SHAPE_SIZE, MAX_STAR_SPIKES};
use crate::geom::{Point, Rect};
use crate::paint::{PaintOverrides, PaintState};

/// Options for one draw operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub radius: Option<f64>,
    pub radius_x: Option<f64>,
    pub radius_y: Option<f64>,
    /// Rotation in radians about the shape's center.
    pub rotation: f64,
    /// Vertices for lines, arrows, polygons and bezier curves.
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub paint: PaintState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<PaintOverrides>,
    pub props: serde_json::Value,
}

impl DrawConfig {
    /// Options for a shape at `(x, y)` with no size and default paint.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, ..Self::default() }
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    #[must_use]
    pub fn with_paint(mut self, paint: PaintState) -> Self {
        self.paint = paint;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: PaintOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }

    /// The same options moved by `(dx, dy)`, vertices included.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        let mut moved = self.clone();
        moved.x += dx;
        moved.y += dy;
        for p in &mut moved.points {
            p.x += dx;
            p.y += dy;
        }
        moved
    }

    /// Bounding box from the sizing rules, in the shape's own coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        if self.width.is_some() || self.height.is_some() {
            return Rect::new(
                self.x,
                self.y,
                self.width.unwrap_or(DEFAULT_SHAPE_SIZE),
                self.height.unwrap_or(DEFAULT_SHAPE_SIZE),
            );
        }
        if let Some(r) = self.radius {
            return Rect::new(self.x - r, self.y - r, r * 2.0, r * 2.0);
        }
        if self.radius_x.is_some() || self.radius_y.is_some() {
            let rx = self.radius_x.or(self.radius_y).unwrap_or_default();
            let ry = self.radius_y.or(self.radius_x).unwrap_or_default();
            return Rect::new(self.x - rx, self.y - ry, rx * 2.0, ry * 2.0);
        }
        if let Some(envelope) = Rect::enclosing(&self.points) {
            return envelope;
        }
        Rect::new(self.x, self.y, DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE)
    }

    /// Area the operation can paint: bounds and vertices, grown by half the
    /// stroke width plus the widest shadow that may apply.
    #[must_use]
    pub fn damage_bounds(&self) -> Rect {
        let base = match Rect::enclosing(&self.points) {
            Some(envelope) => self.bounds().union(&envelope),
            None => self.bounds(),
        };
        let stroke = self.paint.line_width.unwrap_or(1.0).max(0.0) / 2.0;
        let batch_shadow = self.paint.effective_shadow().map_or(0.0, |s| s.extent());
        let op_shadow = self
            .overrides
            .as_ref()
            .and_then(|o| o.shadow.as_ref())
            .map_or(0.0, |s| s.extent());
        base.inflate(stroke + batch_shadow.max(op_shadow))
    }

    /// Center of [`DrawConfig::bounds`].
    #[must_use]
    pub fn center(&self) -> Point {
        let b = self.bounds();
        Point::new(b.x + b.width / 2.0, b.y + b.height / 2.0)
    }

    /// Per-operation overrides, if any are actually set.
    #[must_use]
    pub fn active_overrides(&self) -> Option<&PaintOverrides> {
        self.overrides.as_ref().filter(|o| !o.is_empty())
    }

    #[must_use]
    pub fn props(&self) -> Props<'_> {
        Props::new(&self.props)
    }
}

/// Typed access to common fields of a [`DrawConfig::props`] bag.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Label or body text. Empty string when absent.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// Font size in surface units. Defaults to `16.0`.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.value
            .get("font_size")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(16.0)
    }

    /// CSS font family. Defaults to `"sans-serif"`.
    #[must_use]
    pub fn font_family(&self) -> &'a str {
        self.value
            .get("font_family")
            .and_then(|v| v.as_str())
            .unwrap_or("sans-serif")
    }

    /// Canvas `textAlign` value. Defaults to `"left"`.
    #[must_use]
    pub fn text_align(&self) -> &'a str {
        self.value
            .get("text_align")
            .and_then(|v| v.as_str())
            .unwrap_or("left")
    }

    /// Outer points of a star. Defaults to `5`, clamped to
    /// `3..=MAX_STAR_SPIKES`.
    #[must_use]
    pub fn spikes(&self) -> u32 {
        self.value
            .get("spikes")
            .and_then(serde_json::Value::as_u64)
            .map_or(5, |n| u32::try_from(n).unwrap_or(MAX_STAR_SPIKES))
            .clamp(3, MAX_STAR_SPIKES)
    }

    /// Inner radius of a star as a fraction of the outer radius. Defaults to `0.5`.
    #[must_use]
    pub fn inner_ratio(&self) -> f64 {
        self.value
            .get("inner_ratio")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.5)
            .clamp(0.0, 1.0)
    }

    /// Arrowhead length in surface units. Defaults to `12.0`.
    #[must_use]
    pub fn head_size(&self) -> f64 {
        self.value
            .get("head_size")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(12.0)
    }
}
