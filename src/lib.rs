//! Rendering-optimization core for 2D raster canvases.
//!
//! Sits between a layout layer that wants shapes drawn and a host raster
//! context that paints pixels. Draw calls are queued and replayed in batches
//! that share paint state; the area every call can touch is tracked as
//! merged dirty regions; offscreen surfaces are pooled; and shapes with event
//! handlers are indexed in a quadtree so pointer and touch input resolves to
//! the topmost shape under the cursor.
//!
//! Nothing here depends on a browser. Hosts implement [`raster::RasterContext`]
//! and [`raster::SurfaceFactory`]; the `drawkit_canvas` crate does so for
//! `CanvasRenderingContext2d`, and [`headless`] does so in memory.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::Engine`], wiring every subsystem for one output |
//! | [`batch`] | Operation queue, paint-state grouping, retry scheduling |
//! | [`dirty`] | Dirty-region tracking with spatial merge |
//! | [`pool`] | Reusable offscreen surfaces keyed by exact size |
//! | [`interactive`] | Hit-testing plus click/hover/tap/hold dispatch |
//! | [`spatial`] | Region quadtree shared by `dirty` and `interactive` |
//! | [`cache`] | Gradient and pattern cache |
//! | [`registry`] | Shape kinds and their drawing routines |
//! | [`options`] | Per-shape draw options and sizing rules |
//! | [`paint`] | Paint state, overrides, gradients, patterns |
//! | [`raster`] | Host context, surface and factory traits |
//! | [`headless`] | Recording host used by tests and server-side callers |
//! | [`clock`] | Injectable time source and throttling |
//! | [`config`] | Tuning knobs, defaults, env and JSON loading |
//! | [`metrics`] | Per-subsystem counters |
//! | [`error`] | Error taxonomy |
//! | [`geom`] | Points and rectangles |
//! | [`consts`] | Shared default constants |

pub mod batch;
pub mod cache;
pub mod clock;
pub mod config;
pub mod consts;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod geom;
pub mod headless;
pub mod interactive;
pub mod metrics;
pub mod options;
pub mod paint;
pub mod pool;
pub mod raster;
pub mod registry;
pub mod spatial;

pub use engine::{Engine, Frame, TickReport};
pub use error::{ContextError, DrawError};
