//! Composition root.
//!
//! [`Engine`] owns one of each subsystem and wires them the way a layout
//! layer uses them: `draw` queues an operation (marking its damage dirty) and
//! registers its handlers for hit-testing; `render` replays the queue onto a
//! pooled surface; `tick` drives everything that waits on time.
//!
//! A frame can hold more operations than the queue. When a `draw` fills the
//! queue, the engine takes the frame's surface from the pool early and the
//! batcher flushes into it; `render` then finishes that same surface.
//!
//! The engine holds no host objects beyond what the factory hands it, so the
//! same code runs against the browser binding and the recording host.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::rc::Rc;

use tracing::{debug, info};

use crate::batch::{FlushReport, OperationBatcher, OperationId};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::dirty::{DirtyRegion, DirtyRegionTracker};
use crate::error::DrawError;
use crate::geom::Rect;
use crate::interactive::{Handlers, InteractiveIndex, LayoutContext, ShapeEvent};
use crate::metrics::MetricsSnapshot;
use crate::options::DrawConfig;
use crate::pool::ResourcePool;
use crate::raster::{ContextOf, Surface, SurfaceFactory};
use crate::registry::{ShapeKind, ToolRegistry};

/// A rendered frame: the surface the queue was replayed onto, what the
/// flush did, and the regions that changed since the previous frame.
#[derive(Debug)]
pub struct Frame<S> {
    pub surface: S,
    pub report: FlushReport,
    pub dirty: Vec<DirtyRegion>,
}

/// What one [`Engine::tick`] did.
#[derive(Debug, Default)]
pub struct TickReport {
    pub retries_requeued: usize,
    pub surfaces_expired: usize,
    pub events: Vec<ShapeEvent>,
}

pub struct Engine<F: SurfaceFactory> {
    batcher: OperationBatcher<ContextOf<F>>,
    pool: ResourcePool<F>,
    interactive: InteractiveIndex,
    /// Surface of the frame being built, once an automatic flush needed one.
    frame: Option<F::Surface>,
    config: EngineConfig,
    width: u32,
    height: u32,
}

impl<F: SurfaceFactory> Engine<F> {
    /// Build an engine for a `width x height` output.
    #[must_use]
    pub fn new(
        factory: F,
        registry: ToolRegistry<ContextOf<F>>,
        config: EngineConfig,
        clock: Rc<dyn Clock>,
        width: u32,
        height: u32,
    ) -> Self {
        let bounds = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));
        let dirty = DirtyRegionTracker::new(bounds, config.dirty, config.spatial);
        info!(width, height, tools = registry.len(), "drawing engine created");
        Self {
            batcher: OperationBatcher::new(registry, config.batch, dirty, Rc::clone(&clock)),
            pool: ResourcePool::new(factory, config.pool, Rc::clone(&clock)),
            interactive: InteractiveIndex::new(bounds, config.spatial, config.interaction, clock),
            frame: None,
            config,
            width,
            height,
        }
    }

    // --- Drawing ---

    /// Queue `shape` inside `layout` and track it for hit-testing under
    /// `shape_id`. Drawing the same id again replaces its interactive entry.
    ///
    /// # Errors
    ///
    /// [`DrawError::UnknownTool`] when `shape` has no routine, or
    /// [`DrawError::SurfaceCreationFailed`] when the queue is full and no
    /// frame surface is available; nothing is queued or registered then.
    /// Errors from an automatic flush are also returned, after the shape has
    /// been registered.
    pub fn draw(
        &mut self,
        shape_id: &str,
        shape: impl Into<ShapeKind>,
        options: DrawConfig,
        layout: &LayoutContext,
        handlers: Handlers,
    ) -> Result<OperationId, DrawError> {
        let shape = shape.into();
        if !self.batcher.registry().has(&shape) {
            return Err(DrawError::UnknownTool(shape));
        }
        if self.frame.is_none() && self.batcher.pending() + 1 >= self.config.batch.max_queue_size {
            self.frame = Some(self.pool.get_surface(self.width, self.height)?);
            debug!(pending = self.batcher.pending(), "frame surface taken for automatic flush");
        }

        let placed = options.offset(layout.x, layout.y);
        let target = self.frame.as_mut().map(|s| s.context());
        let queued = self.batcher.queue_with(shape, placed, target);
        self.interactive
            .register(shape_id, options, handlers, layout.clone());
        queued
    }

    /// Replay the queue onto the frame's surface: the one automatic flushes
    /// already drew into, or a pooled `width x height` surface.
    ///
    /// # Errors
    ///
    /// [`DrawError::SurfaceCreationFailed`] when no surface is available (the
    /// queue is kept), or any flush error (the surface goes back to the pool).
    pub fn render(&mut self) -> Result<Frame<F::Surface>, DrawError> {
        let mut surface = match self.frame.take() {
            Some(surface) => surface,
            None => self.pool.get_surface(self.width, self.height)?,
        };
        match self.batcher.flush(Some(surface.context())) {
            Ok(report) => {
                let dirty = self.batcher.dirty_mut().take_dirty_regions();
                debug!(executed = report.executed, dirty = dirty.len(), "frame rendered");
                Ok(Frame { surface, report, dirty })
            }
            Err(err) => {
                self.recycle(surface);
                Err(err)
            }
        }
    }

    /// Replay the queue directly onto a host context, such as the visible
    /// canvas. Operations an automatic flush already drew onto a frame
    /// surface are not replayed; that surface is recycled.
    ///
    /// # Errors
    ///
    /// Any flush error.
    pub fn render_into(&mut self, ctx: &mut ContextOf<F>) -> Result<FlushReport, DrawError> {
        if let Some(surface) = self.frame.take() {
            debug!("dropping partial frame surface; render_into does not composite it");
            self.recycle(surface);
        }
        let report = self.batcher.flush(Some(ctx))?;
        self.batcher.dirty_mut().clear_dirty_regions();
        Ok(report)
    }

    /// Hand a frame surface back for reuse.
    pub fn recycle(&mut self, surface: F::Surface) {
        let (width, height) = (surface.width(), surface.height());
        self.pool.return_surface(surface, width, height);
    }

    /// Change the output size. Both spatial indices are rebuilt and the
    /// whole surface is marked dirty.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.frame.take() {
            self.recycle(surface);
        }
        self.width = width;
        self.height = height;
        let (w, h) = (f64::from(width), f64::from(height));
        self.batcher.dirty_mut().update_spatial_bounds(w, h);
        self.batcher.dirty_mut().mark_dirty(0.0, 0.0, w, h);
        self.interactive.update_bounds(w, h);
        info!(width, height, "engine resized");
    }

    /// Re-queue due retries, release parked hover moves and due holds, and
    /// expire idle pooled surfaces.
    pub fn tick(&mut self) -> TickReport {
        TickReport {
            retries_requeued: self.batcher.poll_retries(),
            events: self.interactive.tick(),
            surfaces_expired: self.pool.cleanup(),
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batch: self.batcher.stats(),
            cache: self.batcher.cache_stats(),
            pool: self.pool.stats(),
            dirty: self.batcher.dirty().stats(),
            interaction: self.interactive.stats(),
            dirty_index: self.batcher.dirty().index_stats(),
            interactive_index: self.interactive.index_stats(),
        }
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn batcher(&self) -> &OperationBatcher<ContextOf<F>> {
        &self.batcher
    }

    pub fn batcher_mut(&mut self) -> &mut OperationBatcher<ContextOf<F>> {
        &mut self.batcher
    }

    #[must_use]
    pub fn interactive(&self) -> &InteractiveIndex {
        &self.interactive
    }

    /// Pointer and touch entry points live on the interactive index.
    pub fn interactive_mut(&mut self) -> &mut InteractiveIndex {
        &mut self.interactive
    }

    #[must_use]
    pub fn pool(&self) -> &ResourcePool<F> {
        &self.pool
    }
}
