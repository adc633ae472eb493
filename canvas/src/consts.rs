//! Shared numeric constants for the canvas crate.

// ── Shapes ──────────────────────────────────────────────────────

/// Arrowhead half-angle in radians (~30°).
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// Start angle for star vertices, so the first spike points straight up.
pub const STAR_START_ANGLE: f64 = -std::f64::consts::FRAC_PI_2;

// ── Text ────────────────────────────────────────────────────────

/// Line height as a multiple of the font size for multi-line text.
pub const TEXT_LINE_HEIGHT: f64 = 1.25;

/// Text baseline used by the text tool; `y` is the top of the first line.
pub const TEXT_BASELINE: &str = "top";
