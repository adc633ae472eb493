//! In-memory raster host.
//!
//! [`RecordingContext`] implements [`RasterContext`] by recording every call
//! and, for each fill/stroke/text call, a [`Mark`]: the painted area in
//! surface coordinates together with the paint state active at that moment.
//! Comparing marks is how batched replay is checked against strict FIFO
//! replay, and the recording factory lets server-side composition run without
//! a browser.

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;

use std::collections::HashSet;

use crate::error::{ContextError, DrawError};
use crate::geom::{Point, Rect};
use crate::paint::{BlendMode, LinearGradient, PatternSpec, RadialGradient};
use crate::raster::{RasterContext, Surface, SurfaceFactory};

// =============================================================================
// RECORDED TYPES
// =============================================================================

/// A fill or stroke source as seen by the recording context.
#[derive(Debug, Clone, PartialEq)]
pub enum Style {
    Color(String),
    Gradient(u64),
    Pattern(u64),
}

/// Paint state snapshot attached to each [`Mark`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    pub fill: Style,
    pub stroke: Style,
    pub line_width: f64,
    pub alpha: f64,
    pub blend: BlendMode,
    pub shadow: Option<(String, f64, f64, f64)>,
    origin: Point,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill: Style::Color("#000000".to_owned()),
            stroke: Style::Color("#000000".to_owned()),
            line_width: 1.0,
            alpha: 1.0,
            blend: BlendMode::SourceOver,
            shadow: None,
            origin: Point::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarkKind {
    Fill,
    Stroke,
    Text,
}

/// Something that would have reached the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub kind: MarkKind,
    pub bounds: Rect,
    pub state: DrawState,
}

/// One recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Save,
    Restore,
    FillStyle(Style),
    StrokeStyle(Style),
    LineWidth(f64),
    GlobalAlpha(f64),
    Blend(BlendMode),
    Shadow { color: String, blur: f64, offset_x: f64, offset_y: f64 },
    CreateGradient(u64),
    CreatePattern(u64),
    ClearRect(Rect),
    FillRect(Rect),
    StrokeRect(Rect),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    BezierCurveTo(Point),
    ClosePath,
    Arc { center: Point, radius: f64 },
    Ellipse { center: Point, radius_x: f64, radius_y: f64 },
    Fill,
    Stroke,
    Font(String),
    TextAlign(String),
    TextBaseline(String),
    FillText { text: String, at: Point },
    Translate(Point),
    Rotate(f64),
}

impl Command {
    /// Whether this call changes paint state.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            Self::FillStyle(_)
                | Self::StrokeStyle(_)
                | Self::LineWidth(_)
                | Self::GlobalAlpha(_)
                | Self::Blend(_)
                | Self::Shadow { .. }
        )
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Recording implementation of [`RasterContext`].
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
    marks: Vec<Mark>,
    state: DrawState,
    stack: Vec<DrawState>,
    path: Vec<Point>,
    next_handle: u64,
    images: HashSet<String>,
    rejected_blend: Option<BlendMode>,
}

impl RecordingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an image resolvable by [`RasterContext::create_pattern`].
    pub fn add_image(&mut self, name: impl Into<String>) {
        self.images.insert(name.into());
    }

    /// Make [`RasterContext::set_blend_mode`] fail for `mode`.
    pub fn reject_blend_mode(&mut self, mode: BlendMode) {
        self.rejected_blend = Some(mode);
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[must_use]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Number of paint-state assignments issued so far.
    #[must_use]
    pub fn state_changes(&self) -> usize {
        self.commands.iter().filter(|c| c.is_state_change()).count()
    }

    /// Forget all recorded calls and marks, keeping configuration.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.marks.clear();
        self.stack.clear();
        self.path.clear();
        self.state = DrawState::default();
    }

    fn record(&mut self, command: Command) {
        self.commands.push(command);
    }

    fn absolute(&self, x: f64, y: f64) -> Point {
        Point::new(x + self.state.origin.x, y + self.state.origin.y)
    }

    fn mark(&mut self, kind: MarkKind, bounds: Rect) {
        self.marks.push(Mark { kind, bounds, state: self.state.clone() });
    }

    fn path_bounds(&self) -> Option<Rect> {
        Rect::enclosing(&self.path)
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RasterContext for RecordingContext {
    type Gradient = u64;
    type Pattern = u64;

    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.record(Command::Save);
    }

    fn restore(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
        }
        self.record(Command::Restore);
    }

    fn set_fill_color(&mut self, color: &str) {
        self.state.fill = Style::Color(color.to_owned());
        self.record(Command::FillStyle(self.state.fill.clone()));
    }

    fn set_fill_gradient(&mut self, gradient: &u64) {
        self.state.fill = Style::Gradient(*gradient);
        self.record(Command::FillStyle(self.state.fill.clone()));
    }

    fn set_fill_pattern(&mut self, pattern: &u64) {
        self.state.fill = Style::Pattern(*pattern);
        self.record(Command::FillStyle(self.state.fill.clone()));
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.state.stroke = Style::Color(color.to_owned());
        self.record(Command::StrokeStyle(self.state.stroke.clone()));
    }

    fn set_stroke_gradient(&mut self, gradient: &u64) {
        self.state.stroke = Style::Gradient(*gradient);
        self.record(Command::StrokeStyle(self.state.stroke.clone()));
    }

    fn set_stroke_pattern(&mut self, pattern: &u64) {
        self.state.stroke = Style::Pattern(*pattern);
        self.record(Command::StrokeStyle(self.state.stroke.clone()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
        self.record(Command::LineWidth(width));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha;
        self.record(Command::GlobalAlpha(alpha));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) -> Result<(), ContextError> {
        if self.rejected_blend == Some(mode) {
            return Err(ContextError::new(format!("unsupported composite operation: {}", mode.as_css())));
        }
        self.state.blend = mode;
        self.record(Command::Blend(mode));
        Ok(())
    }

    fn set_shadow(&mut self, color: &str, blur: f64, offset_x: f64, offset_y: f64) {
        self.state.shadow = Some((color.to_owned(), blur, offset_x, offset_y));
        self.record(Command::Shadow { color: color.to_owned(), blur, offset_x, offset_y });
    }

    fn create_linear_gradient(&mut self, spec: &LinearGradient) -> Result<u64, ContextError> {
        if spec.stops.iter().any(|s| !(0.0..=1.0).contains(&s.offset)) {
            return Err(ContextError::new("gradient stop offset outside [0, 1]"));
        }
        let handle = self.next_handle();
        self.record(Command::CreateGradient(handle));
        Ok(handle)
    }

    fn create_radial_gradient(&mut self, spec: &RadialGradient) -> Result<u64, ContextError> {
        if spec.r0 < 0.0 || spec.r1 < 0.0 {
            return Err(ContextError::new("negative gradient radius"));
        }
        let handle = self.next_handle();
        self.record(Command::CreateGradient(handle));
        Ok(handle)
    }

    fn create_pattern(&mut self, spec: &PatternSpec) -> Result<u64, ContextError> {
        if !self.images.contains(&spec.image) {
            return Err(ContextError::new(format!("unknown image: {}", spec.image)));
        }
        let handle = self.next_handle();
        self.record(Command::CreatePattern(handle));
        Ok(handle)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let origin = self.absolute(x, y);
        let area = Rect::new(origin.x, origin.y, width, height);
        self.marks.retain(|m| !area.contains_rect(&m.bounds));
        self.record(Command::ClearRect(area));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let origin = self.absolute(x, y);
        let area = Rect::new(origin.x, origin.y, width, height);
        self.mark(MarkKind::Fill, area);
        self.record(Command::FillRect(area));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let origin = self.absolute(x, y);
        let area = Rect::new(origin.x, origin.y, width, height);
        self.mark(MarkKind::Stroke, area);
        self.record(Command::StrokeRect(area));
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.record(Command::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.absolute(x, y);
        self.path.push(p);
        self.record(Command::MoveTo(p));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.absolute(x, y);
        self.path.push(p);
        self.record(Command::LineTo(p));
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        let c1 = self.absolute(cp1x, cp1y);
        let c2 = self.absolute(cp2x, cp2y);
        let end = self.absolute(x, y);
        self.path.extend([c1, c2, end]);
        self.record(Command::BezierCurveTo(end));
    }

    fn close_path(&mut self) {
        self.record(Command::ClosePath);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, _start: f64, _end: f64) -> Result<(), ContextError> {
        if radius < 0.0 {
            return Err(ContextError::new("negative arc radius"));
        }
        let center = self.absolute(x, y);
        self.path.push(Point::new(center.x - radius, center.y - radius));
        self.path.push(Point::new(center.x + radius, center.y + radius));
        self.record(Command::Arc { center, radius });
        Ok(())
    }

    fn ellipse(&mut self, x: f64, y: f64, radius_x: f64, radius_y: f64, _rotation: f64) -> Result<(), ContextError> {
        if radius_x < 0.0 || radius_y < 0.0 {
            return Err(ContextError::new("negative ellipse radius"));
        }
        let center = self.absolute(x, y);
        self.path.push(Point::new(center.x - radius_x, center.y - radius_y));
        self.path.push(Point::new(center.x + radius_x, center.y + radius_y));
        self.record(Command::Ellipse { center, radius_x, radius_y });
        Ok(())
    }

    fn fill(&mut self) {
        if let Some(bounds) = self.path_bounds() {
            self.mark(MarkKind::Fill, bounds);
        }
        self.record(Command::Fill);
    }

    fn stroke(&mut self) {
        if let Some(bounds) = self.path_bounds() {
            self.mark(MarkKind::Stroke, bounds);
        }
        self.record(Command::Stroke);
    }

    fn set_font(&mut self, font: &str) {
        self.record(Command::Font(font.to_owned()));
    }

    fn set_text_align(&mut self, align: &str) {
        self.record(Command::TextAlign(align.to_owned()));
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.record(Command::TextBaseline(baseline.to_owned()));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), ContextError> {
        let at = self.absolute(x, y);
        self.mark(MarkKind::Text, Rect::new(at.x, at.y, 0.0, 0.0));
        self.record(Command::FillText { text: text.to_owned(), at });
        Ok(())
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), ContextError> {
        self.state.origin = Point::new(self.state.origin.x + dx, self.state.origin.y + dy);
        self.record(Command::Translate(Point::new(dx, dy)));
        Ok(())
    }

    fn rotate(&mut self, radians: f64) -> Result<(), ContextError> {
        self.record(Command::Rotate(radians));
        Ok(())
    }
}

// =============================================================================
// SURFACE + FACTORY
// =============================================================================

/// Fixed-size surface backed by a [`RecordingContext`].
#[derive(Debug)]
pub struct RecordingSurface {
    id: u64,
    width: u32,
    height: u32,
    context: RecordingContext,
}

impl RecordingSurface {
    /// Creation order within the factory that made it; stable across pooling.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Surface for RecordingSurface {
    type Context = RecordingContext;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn context(&mut self) -> &mut RecordingContext {
        &mut self.context
    }
}

/// Factory for [`RecordingSurface`]s.
#[derive(Debug, Default)]
pub struct RecordingFactory {
    created: u64,
    unavailable: Option<String>,
}

impl RecordingFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose host lacks surface support; every creation fails with `reason`.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { created: 0, unavailable: Some(reason.into()) }
    }

    /// Surfaces created so far.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.created
    }
}

impl SurfaceFactory for RecordingFactory {
    type Surface = RecordingSurface;

    fn create_surface(&mut self, width: u32, height: u32) -> Result<RecordingSurface, DrawError> {
        if let Some(reason) = &self.unavailable {
            return Err(DrawError::SurfaceCreationFailed { width, height, reason: reason.clone() });
        }
        if width == 0 || height == 0 {
            return Err(DrawError::SurfaceCreationFailed { width, height, reason: "zero-sized surface".to_owned() });
        }
        self.created += 1;
        Ok(RecordingSurface { id: self.created, width, height, context: RecordingContext::new() })
    }
}
