//! Host raster interface.
//!
//! The core never draws pixels itself. It talks to an immediate-mode 2D
//! context shaped after `CanvasRenderingContext2D` through [`RasterContext`],
//! and obtains drawing surfaces through [`SurfaceFactory`]. The browser
//! binding lives in the `drawkit_canvas` crate; [`crate::headless`] provides
//! an in-memory implementation.
//!
//! Calls that the browser API can reject return `Result<_, ContextError>`;
//! the rest are infallible, as in the DOM API.

use crate::error::{ContextError, DrawError};
use crate::paint::{BlendMode, LinearGradient, PatternSpec, RadialGradient};

/// Immediate-mode 2D drawing context.
pub trait RasterContext {
    /// Host gradient handle, cached by the batcher.
    type Gradient: Clone;
    /// Host pattern handle, cached by the batcher.
    type Pattern: Clone;

    // --- State stack ---

    fn save(&mut self);
    fn restore(&mut self);

    // --- Paint state ---

    fn set_fill_color(&mut self, color: &str);
    fn set_fill_gradient(&mut self, gradient: &Self::Gradient);
    fn set_fill_pattern(&mut self, pattern: &Self::Pattern);
    fn set_stroke_color(&mut self, color: &str);
    fn set_stroke_gradient(&mut self, gradient: &Self::Gradient);
    fn set_stroke_pattern(&mut self, pattern: &Self::Pattern);
    fn set_line_width(&mut self, width: f64);
    fn set_global_alpha(&mut self, alpha: f64);

    /// # Errors
    ///
    /// Returns an error if the host does not support `mode`.
    fn set_blend_mode(&mut self, mode: BlendMode) -> Result<(), ContextError>;

    fn set_shadow(&mut self, color: &str, blur: f64, offset_x: f64, offset_y: f64);

    // --- Paint sources ---

    /// # Errors
    ///
    /// Returns an error if the host rejects the gradient geometry or a stop.
    fn create_linear_gradient(&mut self, spec: &LinearGradient) -> Result<Self::Gradient, ContextError>;

    /// # Errors
    ///
    /// Returns an error if the host rejects the gradient geometry or a stop.
    fn create_radial_gradient(&mut self, spec: &RadialGradient) -> Result<Self::Gradient, ContextError>;

    /// # Errors
    ///
    /// Returns an error if the pattern image cannot be resolved.
    fn create_pattern(&mut self, spec: &PatternSpec) -> Result<Self::Pattern, ContextError>;

    // --- Rectangles ---

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    // --- Paths ---

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64);
    fn close_path(&mut self);

    /// # Errors
    ///
    /// Returns an error for a negative radius.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), ContextError>;

    /// # Errors
    ///
    /// Returns an error for a negative radius.
    fn ellipse(&mut self, x: f64, y: f64, radius_x: f64, radius_y: f64, rotation: f64) -> Result<(), ContextError>;

    fn fill(&mut self);
    fn stroke(&mut self);

    // --- Text ---

    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);

    /// # Errors
    ///
    /// Returns an error if the host fails to shape or paint the text.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), ContextError>;

    // --- Transform ---

    /// # Errors
    ///
    /// Returns an error if the host rejects the transform.
    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), ContextError>;

    /// # Errors
    ///
    /// Returns an error if the host rejects the transform.
    fn rotate(&mut self, radians: f64) -> Result<(), ContextError>;
}

/// A raster-backed drawing surface (a canvas element, an offscreen bitmap).
pub trait Surface {
    type Context: RasterContext;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn context(&mut self) -> &mut Self::Context;
}

/// Host primitive that allocates new surfaces.
pub trait SurfaceFactory {
    type Surface: Surface;

    /// # Errors
    ///
    /// Returns [`DrawError::SurfaceCreationFailed`] when the host cannot
    /// provide a surface (no document, missing native module, zero size).
    fn create_surface(&mut self, width: u32, height: u32) -> Result<Self::Surface, DrawError>;
}

/// Context type of the surfaces a factory produces.
pub type ContextOf<F> = <<F as SurfaceFactory>::Surface as Surface>::Context;
