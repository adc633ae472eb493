//! Paint model: colors, gradients, patterns and the grouped paint state.
//!
//! A [`PaintState`] is the set of context properties an operation needs
//! before its shape routine runs. Operations whose states produce equal
//! [`PaintKey`]s share one state application during replay. The key is built
//! structurally (floats by bit pattern, `-0.0` folded into `0.0`), so it never
//! needs a textual round-trip.

#[cfg(test)]
#[path = "paint_test.rs"]
mod paint_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// PAINT
// =============================================================================

/// One gradient stop; `offset` is in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

/// Linear gradient from `(x0, y0)` to `(x1, y1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub stops: Vec<ColorStop>,
}

/// Radial gradient between two circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    pub x0: f64,
    pub y0: f64,
    pub r0: f64,
    pub x1: f64,
    pub y1: f64,
    pub r1: f64,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Repetition {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

impl Repetition {
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Repeat => "repeat",
            Self::RepeatX => "repeat-x",
            Self::RepeatY => "repeat-y",
            Self::NoRepeat => "no-repeat",
        }
    }
}

/// Image pattern; `image` names an image the host context can resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub image: String,
    #[serde(default)]
    pub repetition: Repetition,
}

/// A fill or stroke source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paint {
    /// Any CSS color string.
    Color(String),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
    Pattern(PatternSpec),
}

impl Paint {
    #[must_use]
    pub fn color(css: impl Into<String>) -> Self {
        Self::Color(css.into())
    }
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Canvas compositing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    SourceOver,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Lighter,
    Xor,
}

impl BlendMode {
    /// Value for `CanvasRenderingContext2D.globalCompositeOperation`.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Lighter => "lighter",
            Self::Xor => "xor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

impl Shadow {
    /// How far the shadow can paint outside the shape's bounds.
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.blur + self.offset_x.abs().max(self.offset_y.abs())
    }
}

/// Glow is an unoffset shadow; it replaces `shadow` when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    pub color: String,
    pub size: f64,
}

impl Glow {
    #[must_use]
    pub fn as_shadow(&self) -> Shadow {
        Shadow { color: self.color.clone(), blur: self.size, offset_x: 0.0, offset_y: 0.0 }
    }
}

// =============================================================================
// PAINT STATE
// =============================================================================

/// Context properties shared by a batch of operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintState {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub line_width: Option<f64>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<BlendMode>,
    pub shadow: Option<Shadow>,
    pub glow: Option<Glow>,
}

impl PaintState {
    /// Structural grouping key.
    #[must_use]
    pub fn key(&self) -> PaintKey {
        PaintKey {
            fill: self.fill.as_ref().map(PaintId::from),
            stroke: self.stroke.as_ref().map(PaintId::from),
            line_width: self.line_width.map(bits),
            opacity: self.opacity.map(bits),
            blend_mode: self.blend_mode,
            shadow: self.shadow.as_ref().map(ShadowId::from),
            glow: self.glow.as_ref().map(|g| (g.color.clone(), bits(g.size))),
        }
    }

    /// The shadow actually applied: glow wins over shadow.
    #[must_use]
    pub fn effective_shadow(&self) -> Option<Shadow> {
        match (&self.glow, &self.shadow) {
            (Some(glow), _) => Some(glow.as_shadow()),
            (None, Some(shadow)) => Some(shadow.clone()),
            (None, None) => None,
        }
    }
}

/// Per-operation paint applied on top of its batch's state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintOverrides {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub shadow: Option<Shadow>,
}

impl PaintOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.stroke.is_none() && self.shadow.is_none()
    }
}

// =============================================================================
// KEY
// =============================================================================

/// Hashable identity of a [`PaintState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaintKey {
    fill: Option<PaintId>,
    stroke: Option<PaintId>,
    line_width: Option<u64>,
    opacity: Option<u64>,
    blend_mode: Option<BlendMode>,
    shadow: Option<ShadowId>,
    glow: Option<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PaintId {
    Color(String),
    Linear([u64; 4], Vec<(u64, String)>),
    Radial([u64; 6], Vec<(u64, String)>),
    Pattern(String, Repetition),
}

impl From<&Paint> for PaintId {
    fn from(paint: &Paint) -> Self {
        match paint {
            Paint::Color(c) => Self::Color(c.clone()),
            Paint::LinearGradient(g) => Self::Linear([bits(g.x0), bits(g.y0), bits(g.x1), bits(g.y1)], stop_ids(&g.stops)),
            Paint::RadialGradient(g) => Self::Radial(
                [bits(g.x0), bits(g.y0), bits(g.r0), bits(g.x1), bits(g.y1), bits(g.r1)],
                stop_ids(&g.stops),
            ),
            Paint::Pattern(p) => Self::Pattern(p.image.clone(), p.repetition),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShadowId {
    color: String,
    blur: u64,
    offset_x: u64,
    offset_y: u64,
}

impl From<&Shadow> for ShadowId {
    fn from(s: &Shadow) -> Self {
        Self { color: s.color.clone(), blur: bits(s.blur), offset_x: bits(s.offset_x), offset_y: bits(s.offset_y) }
    }
}

fn stop_ids(stops: &[ColorStop]) -> Vec<(u64, String)> {
    stops.iter().map(|s| (bits(s.offset), s.color.clone())).collect()
}

fn bits(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}
