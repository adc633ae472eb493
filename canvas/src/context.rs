//! [`RasterContext`] over `CanvasRenderingContext2d`.
//!
//! This module and [`crate::surface`] are the only places that touch the DOM
//! drawing API. Fallible `Canvas2D` calls come back as `JsValue` errors and are
//! converted to [`ContextError`] at the boundary.

use std::collections::HashMap;

use drawkit::error::ContextError;
use drawkit::paint::{BlendMode, ColorStop, LinearGradient, PatternSpec, RadialGradient};
use drawkit::raster::RasterContext;
use tracing::warn;
use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasPattern, CanvasRenderingContext2d, HtmlImageElement};

/// Browser drawing context plus the images that patterns may reference.
pub struct WebContext {
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
}

impl WebContext {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx, images: HashMap::new() }
    }

    /// Make `image` available to pattern paints under `name`.
    pub fn add_image(&mut self, name: impl Into<String>, image: HtmlImageElement) {
        self.images.insert(name.into(), image);
    }

    #[must_use]
    pub fn raw(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

/// Convert a DOM exception into a [`ContextError`].
pub(crate) fn js_error(err: &JsValue) -> ContextError {
    ContextError::new(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

#[allow(clippy::cast_possible_truncation)]
fn add_stops(gradient: &CanvasGradient, stops: &[ColorStop]) -> Result<(), ContextError> {
    for stop in stops {
        gradient
            .add_color_stop(stop.offset as f32, &stop.color)
            .map_err(|e| js_error(&e))?;
    }
    Ok(())
}

impl RasterContext for WebContext {
    type Gradient = CanvasGradient;
    type Pattern = CanvasPattern;

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_fill_color(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_fill_gradient(&mut self, gradient: &CanvasGradient) {
        self.ctx.set_fill_style_canvas_gradient(gradient);
    }

    fn set_fill_pattern(&mut self, pattern: &CanvasPattern) {
        self.ctx.set_fill_style_canvas_pattern(pattern);
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_stroke_gradient(&mut self, gradient: &CanvasGradient) {
        self.ctx.set_stroke_style_canvas_gradient(gradient);
    }

    fn set_stroke_pattern(&mut self, pattern: &CanvasPattern) {
        self.ctx.set_stroke_style_canvas_pattern(pattern);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) -> Result<(), ContextError> {
        self.ctx
            .set_global_composite_operation(mode.as_css())
            .map_err(|e| js_error(&e))
    }

    fn set_shadow(&mut self, color: &str, blur: f64, offset_x: f64, offset_y: f64) {
        self.ctx.set_shadow_color(color);
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_offset_x(offset_x);
        self.ctx.set_shadow_offset_y(offset_y);
    }

    fn create_linear_gradient(&mut self, spec: &LinearGradient) -> Result<CanvasGradient, ContextError> {
        let gradient = self.ctx.create_linear_gradient(spec.x0, spec.y0, spec.x1, spec.y1);
        add_stops(&gradient, &spec.stops)?;
        Ok(gradient)
    }

    fn create_radial_gradient(&mut self, spec: &RadialGradient) -> Result<CanvasGradient, ContextError> {
        let gradient = self
            .ctx
            .create_radial_gradient(spec.x0, spec.y0, spec.r0, spec.x1, spec.y1, spec.r1)
            .map_err(|e| js_error(&e))?;
        add_stops(&gradient, &spec.stops)?;
        Ok(gradient)
    }

    fn create_pattern(&mut self, spec: &PatternSpec) -> Result<CanvasPattern, ContextError> {
        let Some(image) = self.images.get(&spec.image) else {
            warn!(image = %spec.image, "pattern references an unknown image");
            return Err(ContextError::new(format!("unknown image: {}", spec.image)));
        };
        self.ctx
            .create_pattern_with_html_image_element(image, spec.repetition.as_css())
            .map_err(|e| js_error(&e))?
            .ok_or_else(|| ContextError::new(format!("image not ready: {}", spec.image)))
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.fill_rect(x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.stroke_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.ctx.bezier_curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), ContextError> {
        self.ctx.arc(x, y, radius, start, end).map_err(|e| js_error(&e))
    }

    fn ellipse(&mut self, x: f64, y: f64, radius_x: f64, radius_y: f64, rotation: f64) -> Result<(), ContextError> {
        self.ctx
            .ellipse(x, y, radius_x, radius_y, rotation, 0.0, std::f64::consts::TAU)
            .map_err(|e| js_error(&e))
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.ctx.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), ContextError> {
        self.ctx.fill_text(text, x, y).map_err(|e| js_error(&e))
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), ContextError> {
        self.ctx.translate(dx, dy).map_err(|e| js_error(&e))
    }

    fn rotate(&mut self, radians: f64) -> Result<(), ContextError> {
        self.ctx.rotate(radians).map_err(|e| js_error(&e))
    }
}
