//! Interactive hit-testing and pointer/touch dispatch.
//!
//! DESIGN
//! ======
//! Shapes that carry at least one handler are kept in a side table keyed by
//! shape id and mirrored into a quadtree with the exact bounds used at
//! insert, so removal always takes the direct descent path. Registering an id
//! again removes the previous entry first.
//!
//! `resolve` uses the quadtree as a coarse filter and exact containment as the
//! authority. When several shapes contain the point, the most recently
//! registered one wins, matching paint order.
//!
//! Hover is throttled: a move inside the quiet period is parked and released
//! by `tick`. Hover and leave fire only when the shape under the pointer
//! changes. Touches are tracked per identifier. The tap target is resolved at
//! touch start; a hold fires once the touch has stayed put for `hold_ms` and
//! suppresses the tap. Two taps on the same shape within the double-tap window
//! and distance form a double-tap.
//!
//! Every entry point returns the events it dispatched, in order, after
//! invoking the matching handlers.

#[cfg(test)]
#[path = "interactive_test.rs"]
mod interactive_test;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::clock::{Clock, Throttle};
use crate::config::{InteractionConfig, SpatialConfig};
use crate::geom::{Point, Rect};
use crate::metrics::InteractionStats;
use crate::options::DrawConfig;
use crate::spatial::{QuadTree, SpatialObject, TreeStats};

pub type ShapeId = String;

/// Host touch identifier (`Touch.identifier` in the DOM).
pub type TouchId = i32;

pub type Handler = Rc<dyn Fn(&ShapeEvent)>;

// =============================================================================
// EVENTS + HANDLERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    Hover,
    Leave,
    Tap,
    DoubleTap,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeEvent {
    pub kind: EventKind,
    pub shape_id: ShapeId,
    pub layout: String,
    /// Pointer or touch position that produced the event.
    pub point: Point,
    pub bounds: Rect,
}

/// Event callbacks attached to a shape. A tap on a shape without `on_tap`
/// falls back to `on_click`.
#[derive(Clone, Default)]
pub struct Handlers {
    pub on_click: Option<Handler>,
    pub on_hover: Option<Handler>,
    pub on_leave: Option<Handler>,
    pub on_tap: Option<Handler>,
    pub on_double_tap: Option<Handler>,
    pub on_hold: Option<Handler>,
}

impl Handlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on_click.is_none()
            && self.on_hover.is_none()
            && self.on_leave.is_none()
            && self.on_tap.is_none()
            && self.on_double_tap.is_none()
            && self.on_hold.is_none()
    }

    #[must_use]
    pub fn on_click(mut self, f: impl Fn(&ShapeEvent) + 'static) -> Self {
        self.on_click = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_hover(mut self, f: impl Fn(&ShapeEvent) + 'static) -> Self {
        self.on_hover = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_leave(mut self, f: impl Fn(&ShapeEvent) + 'static) -> Self {
        self.on_leave = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_tap(mut self, f: impl Fn(&ShapeEvent) + 'static) -> Self {
        self.on_tap = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_double_tap(mut self, f: impl Fn(&ShapeEvent) + 'static) -> Self {
        self.on_double_tap = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_hold(mut self, f: impl Fn(&ShapeEvent) + 'static) -> Self {
        self.on_hold = Some(Rc::new(f));
        self
    }

    fn for_kind(&self, kind: EventKind) -> Option<(EventKind, &Handler)> {
        match kind {
            EventKind::Click => self.on_click.as_ref().map(|h| (kind, h)),
            EventKind::Hover => self.on_hover.as_ref().map(|h| (kind, h)),
            EventKind::Leave => self.on_leave.as_ref().map(|h| (kind, h)),
            EventKind::Tap => self
                .on_tap
                .as_ref()
                .map(|h| (kind, h))
                .or_else(|| self.on_click.as_ref().map(|h| (EventKind::Click, h))),
            EventKind::DoubleTap => self.on_double_tap.as_ref().map(|h| (kind, h)),
            EventKind::Hold => self.on_hold.as_ref().map(|h| (kind, h)),
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_click", &self.on_click.is_some())
            .field("on_hover", &self.on_hover.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("on_tap", &self.on_tap.is_some())
            .field("on_double_tap", &self.on_double_tap.is_some())
            .field("on_hold", &self.on_hold.is_some())
            .finish()
    }
}

// =============================================================================
// SHAPES
// =============================================================================

/// Owning layout of a shape: its name and the offset applied to the shape's bounds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutContext {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl LayoutContext {
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self { name: name.into(), x, y }
    }
}

#[derive(Debug, Clone)]
pub struct InteractiveShape {
    pub id: ShapeId,
    pub options: DrawConfig,
    pub handlers: Handlers,
    pub layout: LayoutContext,
    /// Bounds in surface coordinates (layout offset applied).
    pub bounds: Rect,
    seq: u64,
}

#[derive(Debug, Clone)]
struct TouchTrack {
    started: Duration,
    start: Point,
    target: Option<ShapeId>,
    hold_armed: bool,
    held: bool,
}

#[derive(Debug, Clone)]
struct TapRecord {
    shape: ShapeId,
    at: Duration,
    point: Point,
}

// =============================================================================
// INDEX
// =============================================================================

pub struct InteractiveIndex {
    shapes: HashMap<ShapeId, InteractiveShape>,
    index: QuadTree<ShapeId>,
    config: InteractionConfig,
    clock: Rc<dyn Clock>,
    next_seq: u64,
    hovered: Option<ShapeId>,
    hover_throttle: Throttle<Point>,
    touches: HashMap<TouchId, TouchTrack>,
    last_tap: Option<TapRecord>,
    stats: InteractionStats,
}

impl InteractiveIndex {
    #[must_use]
    pub fn new(bounds: Rect, spatial: SpatialConfig, config: InteractionConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            shapes: HashMap::new(),
            index: QuadTree::new(bounds, spatial),
            hover_throttle: Throttle::new(config.hover_interval()),
            config,
            clock,
            next_seq: 0,
            hovered: None,
            touches: HashMap::new(),
            last_tap: None,
            stats: InteractionStats::default(),
        }
    }

    // --- Registration ---

    /// Track `id` for hit-testing. Any previous entry for `id` is removed
    /// first; shapes without handlers are not tracked. Returns whether the
    /// shape is now registered.
    pub fn register(
        &mut self,
        id: impl Into<ShapeId>,
        options: DrawConfig,
        handlers: Handlers,
        layout: LayoutContext,
    ) -> bool {
        let id = id.into();
        self.unregister(&id);
        if handlers.is_empty() {
            trace!(%id, "shape has no handlers; not interactive");
            return false;
        }

        let bounds = options.bounds().translate(layout.x, layout.y);
        self.index.insert(SpatialObject::new(id.clone(), bounds));
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(%id, ?bounds, layout = %layout.name, "interactive shape registered");
        self.shapes.insert(id.clone(), InteractiveShape { id, options, handlers, layout, bounds, seq });
        true
    }

    /// Stop tracking `id`. Returns whether it was registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        let Some(shape) = self.shapes.remove(id) else {
            return false;
        };
        self.index.remove(&shape.id, &shape.bounds);
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        true
    }

    /// Forget every shape and all pointer/touch state.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.index.clear();
        self.hovered = None;
        self.hover_throttle.reset();
        self.touches.clear();
        self.last_tap = None;
    }

    /// Rebuild the index for new outer bounds.
    pub fn update_bounds(&mut self, width: f64, height: f64) {
        let mut index = QuadTree::new(Rect::new(0.0, 0.0, width, height), self.index.config());
        for shape in self.shapes.values() {
            index.insert(SpatialObject::new(shape.id.clone(), shape.bounds));
        }
        self.index = index;
        debug!(width, height, shapes = self.shapes.len(), "interactive index rebuilt");
    }

    // --- Hit-testing ---

    /// Topmost registered shape containing `(x, y)`.
    #[must_use]
    pub fn resolve(&self, x: f64, y: f64) -> Option<&InteractiveShape> {
        let pt = Point::new(x, y);
        self.index
            .query_point(pt)
            .into_iter()
            .filter(|obj| obj.bounds.contains_point(pt))
            .filter_map(|obj| self.shapes.get(&obj.id))
            .max_by_key(|shape| shape.seq)
    }

    fn hit(&mut self, pt: Point) -> Option<ShapeId> {
        self.stats.resolves += 1;
        let id = self.resolve(pt.x, pt.y).map(|s| s.id.clone());
        if id.is_some() {
            self.stats.hits += 1;
        }
        id
    }

    // --- Pointer ---

    /// Resolve once and fire `on_click`.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Vec<ShapeEvent> {
        let pt = Point::new(x, y);
        self.hit(pt)
            .and_then(|id| self.dispatch(EventKind::Click, &id, pt))
            .into_iter()
            .collect()
    }

    /// Throttled hover tracking.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<ShapeEvent> {
        let now = self.clock.now();
        match self.hover_throttle.offer(now, Point::new(x, y)) {
            Some(pt) => self.update_hover(pt),
            None => {
                self.stats.throttled_moves += 1;
                Vec::new()
            }
        }
    }

    /// Pointer left the surface: fire `on_leave` for the hovered shape.
    pub fn pointer_leave(&mut self) -> Vec<ShapeEvent> {
        self.hover_throttle.reset();
        let Some(id) = self.hovered.take() else {
            return Vec::new();
        };
        let at = self.shapes.get(&id).map(|s| s.bounds).unwrap_or_default();
        self.dispatch(EventKind::Leave, &id, Point::new(at.x, at.y))
            .into_iter()
            .collect()
    }

    fn update_hover(&mut self, pt: Point) -> Vec<ShapeEvent> {
        let current = self.hit(pt);
        if current == self.hovered {
            return Vec::new();
        }
        let previous = std::mem::replace(&mut self.hovered, current.clone());
        let mut events = Vec::new();
        if let Some(prev) = previous {
            events.extend(self.dispatch(EventKind::Leave, &prev, pt));
        }
        if let Some(next) = current {
            events.extend(self.dispatch(EventKind::Hover, &next, pt));
        }
        events
    }

    /// Release a parked hover move and fire any due holds.
    pub fn tick(&mut self) -> Vec<ShapeEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();
        if let Some(pt) = self.hover_throttle.poll(now) {
            events.extend(self.update_hover(pt));
        }

        let mut due: Vec<TouchId> = self
            .touches
            .keys()
            .copied()
            .filter(|id| self.hold_due(*id, now))
            .collect();
        due.sort_unstable();
        for touch in due {
            events.extend(self.fire_hold(touch));
        }
        events
    }

    // --- Touch ---

    pub fn touch_start(&mut self, touch: TouchId, x: f64, y: f64) -> Vec<ShapeEvent> {
        if !self.config.touch_enabled {
            return Vec::new();
        }
        let start = Point::new(x, y);
        let target = self.hit(start);
        let hold_armed = target
            .as_ref()
            .and_then(|id| self.shapes.get(id))
            .is_some_and(|s| s.handlers.on_hold.is_some());
        trace!(touch, ?target, hold_armed, "touch start");
        self.touches
            .insert(touch, TouchTrack { started: self.clock.now(), start, target, hold_armed, held: false });
        Vec::new()
    }

    /// Any movement disarms a pending hold.
    pub fn touch_move(&mut self, touch: TouchId, _x: f64, _y: f64) -> Vec<ShapeEvent> {
        if let Some(track) = self.touches.get_mut(&touch) {
            track.hold_armed = false;
        }
        Vec::new()
    }

    /// Finish a touch: a due hold fires instead of a tap, otherwise a tap or
    /// double-tap is dispatched to the shape resolved at touch start.
    pub fn touch_end(&mut self, touch: TouchId, x: f64, y: f64) -> Vec<ShapeEvent> {
        let now = self.clock.now();
        if self.hold_due(touch, now) {
            let events = self.fire_hold(touch);
            self.touches.remove(&touch);
            return events;
        }

        let Some(track) = self.touches.remove(&touch) else {
            return Vec::new();
        };
        if track.held {
            return Vec::new();
        }
        let Some(shape) = track.target else {
            self.last_tap = None;
            return Vec::new();
        };

        let end = Point::new(x, y);
        let double = self.last_tap.as_ref().is_some_and(|last| {
            last.shape == shape
                && now.saturating_sub(last.at) <= self.config.double_tap_window()
                && last.point.distance(end) <= self.config.double_tap_distance
        });
        let kind = if double {
            self.last_tap = None;
            let handled = self
                .shapes
                .get(&shape)
                .is_some_and(|s| s.handlers.on_double_tap.is_some());
            if handled { EventKind::DoubleTap } else { EventKind::Tap }
        } else {
            self.last_tap = Some(TapRecord { shape: shape.clone(), at: now, point: end });
            EventKind::Tap
        };
        self.dispatch(kind, &shape, end).into_iter().collect()
    }

    pub fn touch_cancel(&mut self, touch: TouchId) {
        self.touches.remove(&touch);
    }

    fn hold_due(&self, touch: TouchId, now: Duration) -> bool {
        self.touches
            .get(&touch)
            .is_some_and(|t| t.hold_armed && now.saturating_sub(t.started) >= self.config.hold_duration())
    }

    fn fire_hold(&mut self, touch: TouchId) -> Vec<ShapeEvent> {
        let Some(track) = self.touches.get_mut(&touch) else {
            return Vec::new();
        };
        track.hold_armed = false;
        track.held = true;
        let (target, start) = (track.target.clone(), track.start);
        target
            .and_then(|id| self.dispatch(EventKind::Hold, &id, start))
            .into_iter()
            .collect()
    }

    fn dispatch(&mut self, kind: EventKind, id: &str, point: Point) -> Option<ShapeEvent> {
        let shape = self.shapes.get(id)?;
        let (kind, handler) = shape.handlers.for_kind(kind)?;
        let handler = Rc::clone(handler);
        let event = ShapeEvent {
            kind,
            shape_id: shape.id.clone(),
            layout: shape.layout.name.clone(),
            point,
            bounds: shape.bounds,
        };
        self.stats.events_dispatched += 1;
        trace!(?kind, shape = %event.shape_id, "dispatching shape event");
        handler(&event);
        Some(event)
    }

    // --- Accessors ---

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&InteractiveShape> {
        self.shapes.get(id)
    }

    /// Shape currently under the pointer, as of the last released move.
    #[must_use]
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[must_use]
    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    #[must_use]
    pub fn stats(&self) -> InteractionStats {
        self.stats
    }

    #[must_use]
    pub fn index_stats(&self) -> TreeStats {
        self.index.stats()
    }
}
