//! Canvas-element surfaces and the factory the pool draws them from.

use drawkit::error::DrawError;
use drawkit::raster::{Surface, SurfaceFactory};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::context::WebContext;

/// A detached `<canvas>` element and its 2D context.
pub struct WebSurface {
    canvas: HtmlCanvasElement,
    context: WebContext,
}

impl WebSurface {
    /// Wrap an existing canvas, such as the visible one.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the element has no 2D context.
    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, context: WebContext::new(ctx) })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for WebSurface {
    type Context = WebContext;

    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn context(&mut self) -> &mut WebContext {
        &mut self.context
    }
}

/// Creates offscreen canvases from the window's document.
///
/// Without a document (a worker, a non-browser host) every creation fails
/// with [`DrawError::SurfaceCreationFailed`].
#[derive(Default)]
pub struct WebSurfaceFactory {
    document: Option<Document>,
}

impl WebSurfaceFactory {
    /// Factory bound to the current window's document, if there is one.
    #[must_use]
    pub fn new() -> Self {
        Self { document: web_sys::window().and_then(|w| w.document()) }
    }

    #[must_use]
    pub fn with_document(document: Document) -> Self {
        Self { document: Some(document) }
    }

    fn create(document: &Document, width: u32, height: u32) -> Result<WebSurface, JsValue> {
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.set_width(width);
        canvas.set_height(height);
        WebSurface::from_canvas(canvas)
    }
}

impl SurfaceFactory for WebSurfaceFactory {
    type Surface = WebSurface;

    fn create_surface(&mut self, width: u32, height: u32) -> Result<WebSurface, DrawError> {
        let failed = |reason: String| DrawError::SurfaceCreationFailed { width, height, reason };
        if width == 0 || height == 0 {
            return Err(failed("zero-sized surface".to_owned()));
        }
        let Some(document) = &self.document else {
            return Err(failed("no document available".to_owned()));
        };
        let surface = Self::create(document, width, height)
            .map_err(|e| failed(crate::context::js_error(&e).message))?;
        debug!(width, height, "offscreen canvas created");
        Ok(surface)
    }
}
