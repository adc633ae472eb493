//! Browser binding for the drawkit core.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It supplies
//! the host side of [`drawkit::raster`]: a `CanvasRenderingContext2d`-backed
//! context, canvas-element surfaces for the pool, a `performance.now()` clock,
//! and the built-in shape tools. The host JavaScript layer wires DOM events to
//! [`drawkit::interactive::InteractiveIndex`] and calls
//! [`drawkit::Engine::render_into`] once per animation frame.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`context`] | [`context::WebContext`], the `Canvas2D` implementation of `RasterContext` |
//! | [`surface`] | [`surface::WebSurface`] and [`surface::WebSurfaceFactory`] |
//! | [`clock`] | [`clock::PerformanceClock`] |
//! | [`tools`] | Built-in shape tools and [`tools::register_builtin_tools`] |
//! | [`consts`] | Shared numeric constants (arrowhead angle, text line height) |

pub mod clock;
pub mod consts;
pub mod context;
pub mod surface;
pub mod tools;

pub use clock::PerformanceClock;
pub use context::WebContext;
pub use surface::{WebSurface, WebSurfaceFactory};
pub use tools::register_builtin_tools;
