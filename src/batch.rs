//! Draw-operation batcher.
//!
//! DESIGN
//! ======
//! `queue` validates the shape against the registry, stamps the operation,
//! marks its damage area dirty and appends it. A flush drains the whole queue
//! and replays it in three nested grouping passes:
//!
//! 1. by shape kind, groups ordered by first appearance;
//! 2. by paint state ([`PaintKey`]), again by first appearance;
//! 3. groups larger than `proximity_threshold` are stably sorted by
//!    `(row, x)` with rows `row_tolerance` tall, then chunked into
//!    `chunk_size` batches.
//!
//! Each batch runs inside `save`/`restore`: the batch paint state is applied
//! once, then every operation's routine runs, wrapped in its own
//! `save`/`restore` only when it carries overrides.
//!
//! ERROR HANDLING
//! ==============
//! - Unknown shapes fail `queue` with [`DrawError::UnknownTool`]; nothing is
//!   queued or marked dirty.
//! - A host rejecting a paint assignment aborts the flush with
//!   [`DrawError::InvalidCanvasState`].
//! - A failing routine in [`FlushMode::Immediate`] aborts the flush with
//!   [`DrawError::OperationFailed`]. In [`FlushMode::Retry`] it is scheduled
//!   for another attempt after `retry_delay * attempt`; `poll_retries` puts
//!   due operations back at the front of the queue. After `max_retries`
//!   failed retries the operation is dropped and logged.
//!
//! Operations that a flush never reaches (no target, or an aborted flush)
//! are discarded, not retried.

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

use crate::cache::PaintCache;
use crate::clock::Clock;
use crate::config::{BatchConfig, FlushMode};
use crate::dirty::DirtyRegionTracker;
use crate::error::{ContextError, DrawError};
use crate::metrics::{BatchStats, CacheStats};
use crate::options::DrawConfig;
use crate::paint::{Paint, PaintKey, PaintOverrides, PaintState, Shadow};
use crate::raster::RasterContext;
use crate::registry::{ShapeKind, ToolRegistry};

/// Unique identifier of a queued operation.
pub type OperationId = Uuid;

/// One pending paint command. Immutable once queued.
#[derive(Debug, Clone)]
pub struct DrawOperation {
    pub id: OperationId,
    pub shape: ShapeKind,
    pub options: DrawConfig,
    /// Clock reading when the operation was queued.
    pub timestamp: Duration,
    seq: u64,
}

/// What one flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlushReport {
    pub executed: usize,
    pub batches: usize,
    pub state_applications: usize,
    pub failed: usize,
    pub retried: usize,
    pub abandoned: usize,
    pub discarded: usize,
}

#[derive(Debug)]
struct Queued {
    op: DrawOperation,
    /// Retries already spent.
    attempt: u32,
}

#[derive(Debug)]
struct RetryTask {
    queued: Queued,
    due: Duration,
}

struct Batch {
    state: PaintState,
    ops: Vec<Queued>,
}

enum Field {
    Fill,
    Stroke,
}

impl Field {
    fn name(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Stroke => "stroke",
        }
    }
}

pub struct OperationBatcher<C: RasterContext> {
    registry: ToolRegistry<C>,
    queue: VecDeque<Queued>,
    retries: Vec<RetryTask>,
    dirty: DirtyRegionTracker,
    cache: PaintCache<C::Gradient, C::Pattern>,
    config: BatchConfig,
    clock: Rc<dyn Clock>,
    next_seq: u64,
    stats: BatchStats,
}

impl<C: RasterContext> OperationBatcher<C> {
    #[must_use]
    pub fn new(registry: ToolRegistry<C>, config: BatchConfig, dirty: DirtyRegionTracker, clock: Rc<dyn Clock>) -> Self {
        Self {
            registry,
            queue: VecDeque::new(),
            retries: Vec::new(),
            dirty,
            cache: PaintCache::new(config.gradient_cache_size, config.pattern_cache_size),
            config,
            clock,
            next_seq: 0,
            stats: BatchStats::default(),
        }
    }

    // =========================================================================
    // QUEUE
    // =========================================================================

    /// Queue an operation; a full queue is flushed without a target.
    ///
    /// # Errors
    ///
    /// [`DrawError::UnknownTool`] if no routine is registered for `shape`;
    /// otherwise any error from the automatic flush.
    pub fn queue(&mut self, shape: impl Into<ShapeKind>, options: DrawConfig) -> Result<OperationId, DrawError> {
        self.queue_with(shape, options, None)
    }

    /// Queue an operation; a full queue is flushed into `target`.
    ///
    /// # Errors
    ///
    /// [`DrawError::UnknownTool`] if no routine is registered for `shape`;
    /// otherwise any error from the automatic flush. A failed automatic
    /// flush has already drained the queue, this operation included, so
    /// nothing stays pending; its damage area stays marked dirty.
    pub fn queue_with(
        &mut self,
        shape: impl Into<ShapeKind>,
        options: DrawConfig,
        target: Option<&mut C>,
    ) -> Result<OperationId, DrawError> {
        let shape = shape.into();
        if !self.registry.has(&shape) {
            warn!(%shape, "queue: unknown tool");
            return Err(DrawError::UnknownTool(shape));
        }

        let damage = options.damage_bounds();
        self.dirty
            .mark_dirty(damage.x, damage.y, damage.width, damage.height);

        let op = DrawOperation {
            id: Uuid::new_v4(),
            shape,
            options,
            timestamp: self.clock.now(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let id = op.id;
        trace!(%id, shape = %op.shape, "operation queued");
        self.queue.push_back(Queued { op, attempt: 0 });
        self.stats.operations_queued += 1;

        if self.queue.len() >= self.config.max_queue_size {
            self.stats.auto_flushes += 1;
            debug!(queued = self.queue.len(), "queue full; auto-flushing");
            self.flush(target)?;
        }
        Ok(id)
    }

    // =========================================================================
    // FLUSH
    // =========================================================================

    /// Replay every queued operation into `target`, then leave the queue empty.
    ///
    /// With no target the operations are discarded.
    ///
    /// # Errors
    ///
    /// [`DrawError::InvalidCanvasState`] when the host rejects a paint
    /// assignment, or [`DrawError::OperationFailed`] for a failing routine
    /// in immediate mode. Either aborts the flush.
    pub fn flush(&mut self, target: Option<&mut C>) -> Result<FlushReport, DrawError> {
        let drained: Vec<Queued> = self.queue.drain(..).collect();
        let mut report = FlushReport::default();

        let Some(ctx) = target else {
            if !drained.is_empty() {
                report.discarded = drained.len();
                self.stats.operations_discarded += drained.len() as u64;
                warn!(discarded = drained.len(), "flush without target; operations discarded");
            }
            return Ok(report);
        };

        let total = drained.len();
        let batches = self.plan(drained);
        let mut remaining = total;
        for batch in batches {
            remaining -= batch.ops.len();
            if let Err(err) = self.run_batch(ctx, batch, &mut report) {
                report.discarded += remaining;
                self.stats.operations_discarded += remaining as u64;
                error!(code = err.code(), error = %err, discarded = remaining, "flush aborted");
                return Err(err);
            }
        }

        debug!(
            executed = report.executed,
            batches = report.batches,
            state_applications = report.state_applications,
            failed = report.failed,
            "flush complete"
        );
        Ok(report)
    }

    /// Move retries that are due to the front of the queue, in the order they were first queued.
    /// Returns how many were moved.
    pub fn poll_retries(&mut self) -> usize {
        let now = self.clock.now();
        let (mut due, waiting): (Vec<RetryTask>, Vec<RetryTask>) =
            self.retries.drain(..).partition(|t| t.due <= now);
        self.retries = waiting;
        due.sort_by_key(|t| t.queued.op.seq);
        let moved = due.len();
        for task in due.into_iter().rev() {
            self.queue.push_front(task.queued);
        }
        if moved > 0 {
            debug!(moved, "retries re-queued");
        }
        moved
    }

    /// Group queued operations into batches.
    fn plan(&self, ops: Vec<Queued>) -> Vec<Batch> {
        let mut by_shape: IndexMap<ShapeKind, Vec<Queued>> = IndexMap::new();
        for q in ops {
            by_shape.entry(q.op.shape.clone()).or_default().push(q);
        }

        let mut batches = Vec::new();
        for (_, group) in by_shape {
            let mut by_state: IndexMap<PaintKey, Vec<Queued>> = IndexMap::new();
            for q in group {
                by_state.entry(q.op.options.paint.key()).or_default().push(q);
            }

            for (_, mut ops) in by_state {
                let state = ops[0].op.options.paint.clone();
                if ops.len() <= self.config.proximity_threshold {
                    batches.push(Batch { state, ops });
                    continue;
                }

                let tolerance = self.config.row_tolerance;
                ops.sort_by(|a, b| {
                    let (ra, xa) = proximity_key(&a.op.options, tolerance);
                    let (rb, xb) = proximity_key(&b.op.options, tolerance);
                    ra.total_cmp(&rb).then(xa.total_cmp(&xb))
                });
                let chunk = self.config.chunk_size.max(1);
                let mut rest = ops;
                while !rest.is_empty() {
                    let tail = rest.split_off(chunk.min(rest.len()));
                    batches.push(Batch { state: state.clone(), ops: rest });
                    rest = tail;
                }
            }
        }
        batches
    }

    fn run_batch(&mut self, ctx: &mut C, batch: Batch, report: &mut FlushReport) -> Result<(), DrawError> {
        ctx.save();
        if let Err(err) = apply_state(&mut self.cache, ctx, &batch.state) {
            ctx.restore();
            report.discarded += batch.ops.len();
            self.stats.operations_discarded += batch.ops.len() as u64;
            return Err(err);
        }
        report.batches += 1;
        report.state_applications += 1;
        self.stats.batches_executed += 1;
        self.stats.state_applications += 1;

        let multi = batch.ops.len() > 1;
        let mut ops = batch.ops.into_iter();
        while let Some(q) = ops.next() {
            let result = match self.run_op(ctx, &q.op) {
                Ok(result) => result,
                Err(err) => {
                    ctx.restore();
                    let skipped = ops.len() + 1;
                    report.discarded += skipped;
                    self.stats.operations_discarded += skipped as u64;
                    return Err(err);
                }
            };

            match result {
                Ok(()) => {
                    report.executed += 1;
                    self.stats.operations_executed += 1;
                    if multi {
                        self.stats.operations_batched += 1;
                    }
                }
                Err(source) => {
                    report.failed += 1;
                    self.stats.operations_failed += 1;
                    match self.config.flush_mode {
                        FlushMode::Immediate => {
                            ctx.restore();
                            let skipped = ops.len();
                            report.discarded += skipped;
                            self.stats.operations_discarded += skipped as u64;
                            return Err(DrawError::OperationFailed { operation: q.op.id, shape: q.op.shape, source });
                        }
                        FlushMode::Retry => {
                            if self.schedule_retry(q, &source) {
                                report.retried += 1;
                            } else {
                                report.abandoned += 1;
                            }
                        }
                    }
                }
            }
        }

        ctx.restore();
        Ok(())
    }

    /// Run one routine. The outer `Result` carries flush-aborting paint
    /// failures, the inner one the routine's own outcome.
    fn run_op(&mut self, ctx: &mut C, op: &DrawOperation) -> Result<Result<(), ContextError>, DrawError> {
        let overrides = op.options.active_overrides();
        if let Some(overrides) = overrides {
            ctx.save();
            if let Err(err) = apply_overrides(&mut self.cache, ctx, overrides) {
                ctx.restore();
                return Err(err);
            }
        }

        let result = match self.registry.get(&op.shape) {
            Some(tool) => tool(ctx, &op.options),
            None => Err(ContextError::new(format!("no tool registered for {}", op.shape))),
        };

        if overrides.is_some() {
            ctx.restore();
        }
        Ok(result)
    }

    /// Returns false when the retry budget is exhausted and the operation is dropped.
    fn schedule_retry(&mut self, queued: Queued, source: &ContextError) -> bool {
        let attempt = queued.attempt + 1;
        let id = queued.op.id;
        if attempt > self.config.max_retries {
            self.stats.operations_abandoned += 1;
            error!(%id, shape = %queued.op.shape, attempts = attempt, error = %source, "operation abandoned after retries");
            return false;
        }

        let delay = self.config.retry_delay() * attempt;
        let due = self.clock.now() + delay;
        self.stats.retries_scheduled += 1;
        warn!(%id, attempt, delay_ms = delay.as_millis(), error = %source, "operation failed; retry scheduled");
        self.retries.push(RetryTask { queued: Queued { op: queued.op, attempt }, due });
        true
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Operations waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queued operations, front first.
    pub fn queued(&self) -> impl Iterator<Item = &DrawOperation> {
        self.queue.iter().map(|q| &q.op)
    }

    /// Failed operations waiting for their retry to come due.
    #[must_use]
    pub fn pending_retries(&self) -> usize {
        self.retries.len()
    }

    /// Earliest due time among scheduled retries.
    #[must_use]
    pub fn next_retry_due(&self) -> Option<Duration> {
        self.retries.iter().map(|t| t.due).min()
    }

    #[must_use]
    pub fn dirty(&self) -> &DirtyRegionTracker {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyRegionTracker {
        &mut self.dirty
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry<C> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ToolRegistry<C> {
        &mut self.registry
    }

    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

// =============================================================================
// PAINT APPLICATION
// =============================================================================

fn proximity_key(options: &DrawConfig, tolerance: f64) -> (f64, f64) {
    let b = options.bounds();
    let row = if tolerance > 0.0 { (b.y / tolerance).floor() } else { b.y };
    (row, b.x)
}

fn apply_state<C: RasterContext>(
    cache: &mut PaintCache<C::Gradient, C::Pattern>,
    ctx: &mut C,
    state: &PaintState,
) -> Result<(), DrawError> {
    if let Some(fill) = &state.fill {
        apply_paint(cache, ctx, fill, &Field::Fill)?;
    }
    if let Some(stroke) = &state.stroke {
        apply_paint(cache, ctx, stroke, &Field::Stroke)?;
    }
    if let Some(width) = state.line_width {
        ctx.set_line_width(width);
    }
    if let Some(opacity) = state.opacity {
        ctx.set_global_alpha(opacity);
    }
    if let Some(mode) = state.blend_mode {
        ctx.set_blend_mode(mode)
            .map_err(|e| invalid("blend_mode", &e))?;
    }
    if let Some(shadow) = state.effective_shadow() {
        apply_shadow(ctx, &shadow);
    }
    Ok(())
}

fn apply_overrides<C: RasterContext>(
    cache: &mut PaintCache<C::Gradient, C::Pattern>,
    ctx: &mut C,
    overrides: &PaintOverrides,
) -> Result<(), DrawError> {
    if let Some(fill) = &overrides.fill {
        apply_paint(cache, ctx, fill, &Field::Fill)?;
    }
    if let Some(stroke) = &overrides.stroke {
        apply_paint(cache, ctx, stroke, &Field::Stroke)?;
    }
    if let Some(shadow) = &overrides.shadow {
        apply_shadow(ctx, shadow);
    }
    Ok(())
}

fn apply_paint<C: RasterContext>(
    cache: &mut PaintCache<C::Gradient, C::Pattern>,
    ctx: &mut C,
    paint: &Paint,
    field: &Field,
) -> Result<(), DrawError> {
    match paint {
        Paint::Color(color) => match field {
            Field::Fill => ctx.set_fill_color(color),
            Field::Stroke => ctx.set_stroke_color(color),
        },
        Paint::LinearGradient(spec) => {
            let gradient = cache
                .linear_gradient(ctx, spec)
                .map_err(|e| invalid(field.name(), &e))?;
            set_gradient(ctx, &gradient, field);
        }
        Paint::RadialGradient(spec) => {
            let gradient = cache
                .radial_gradient(ctx, spec)
                .map_err(|e| invalid(field.name(), &e))?;
            set_gradient(ctx, &gradient, field);
        }
        Paint::Pattern(spec) => {
            let pattern = cache
                .pattern(ctx, spec)
                .map_err(|e| invalid(field.name(), &e))?;
            match field {
                Field::Fill => ctx.set_fill_pattern(&pattern),
                Field::Stroke => ctx.set_stroke_pattern(&pattern),
            }
        }
    }
    Ok(())
}

fn set_gradient<C: RasterContext>(ctx: &mut C, gradient: &C::Gradient, field: &Field) {
    match field {
        Field::Fill => ctx.set_fill_gradient(gradient),
        Field::Stroke => ctx.set_stroke_gradient(gradient),
    }
}

fn apply_shadow<C: RasterContext>(ctx: &mut C, shadow: &Shadow) {
    ctx.set_shadow(&shadow.color, shadow.blur, shadow.offset_x, shadow.offset_y);
}

fn invalid(field: &'static str, err: &ContextError) -> DrawError {
    DrawError::InvalidCanvasState { field, reason: err.message.clone() }
}
