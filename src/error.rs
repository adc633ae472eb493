//! Error taxonomy for the drawing core.
//!
//! `UnknownTool` and `SurfaceCreationFailed` are returned synchronously from
//! `queue` / `get_surface` and leave all state untouched. `OperationFailed`
//! reaches the caller only from an immediate-mode flush; in retry mode it is
//! handled inside the batcher and shows up in logs and metrics only.
//! `InvalidCanvasState` aborts the flush that raised it.

use crate::batch::OperationId;
use crate::registry::ShapeKind;

/// Failure reported by a host raster context or a shape routine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ContextError {
    pub message: String,
}

impl ContextError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    #[error("unknown tool: {0}")]
    UnknownTool(ShapeKind),
    #[error("surface creation failed ({width}x{height}): {reason}")]
    SurfaceCreationFailed { width: u32, height: u32, reason: String },
    #[error("operation {operation} ({shape}) failed: {source}")]
    OperationFailed {
        operation: OperationId,
        shape: ShapeKind,
        #[source]
        source: ContextError,
    },
    #[error("invalid canvas state for {field}: {reason}")]
    InvalidCanvasState { field: &'static str, reason: String },
}

impl DrawError {
    /// Stable machine-readable code for logs and host-side error mapping.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "E_UNKNOWN_TOOL",
            Self::SurfaceCreationFailed { .. } => "E_SURFACE_CREATION",
            Self::OperationFailed { .. } => "E_OPERATION_FAILED",
            Self::InvalidCanvasState { .. } => "E_INVALID_CANVAS_STATE",
        }
    }
}
