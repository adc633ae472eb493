//! Shared default constants for the drawkit crate.

// ── Spatial index ───────────────────────────────────────────────

/// Objects a quadtree node holds before it tries to split.
pub const DEFAULT_MAX_OBJECTS_PER_NODE: usize = 10;

/// Deepest level a quadtree node may split to (root is level 0).
pub const DEFAULT_MAX_DEPTH: usize = 5;

// ── Batching ────────────────────────────────────────────────────

/// Queue length that triggers an automatic flush.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 50;

/// Retry attempts for a failed operation before it is abandoned.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base retry delay; attempt `n` waits `n * DEFAULT_RETRY_DELAY_MS`.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Paint-state groups larger than this are sorted by proximity and chunked.
pub const DEFAULT_PROXIMITY_THRESHOLD: usize = 10;

/// Vertical distance within which two operations are on the same row.
pub const DEFAULT_ROW_TOLERANCE: f64 = 50.0;

/// Operations per proximity chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 25;

/// Cached gradients kept before the oldest are evicted.
pub const DEFAULT_GRADIENT_CACHE_SIZE: usize = 100;

/// Cached patterns kept before the oldest are evicted.
pub const DEFAULT_PATTERN_CACHE_SIZE: usize = 50;

// ── Dirty regions ───────────────────────────────────────────────

/// Tracked dirty regions before the oldest is dropped.
pub const DEFAULT_MAX_DIRTY_REGIONS: usize = 20;

// ── Surface pool ────────────────────────────────────────────────

/// Idle surfaces kept by the pool.
pub const DEFAULT_MAX_POOL_SIZE: usize = 10;

/// Idle time after which a pooled surface is dropped by `cleanup`.
pub const DEFAULT_POOL_TIMEOUT_MS: u64 = 30_000;

// ── Interaction ─────────────────────────────────────────────────

/// Minimum spacing between hover resolves (~60Hz).
pub const DEFAULT_HOVER_INTERVAL_MS: u64 = 16;

/// Maximum gap between two taps that form a double-tap.
pub const DEFAULT_DOUBLE_TAP_MS: u64 = 300;

/// Maximum distance between two taps that form a double-tap.
pub const DEFAULT_DOUBLE_TAP_DISTANCE: f64 = 20.0;

/// Touch duration after which a stationary touch becomes a hold.
pub const DEFAULT_HOLD_MS: u64 = 500;

/// Most outer points a star may have; larger `spikes` props are clamped.
pub const MAX_STAR_SPIKES: u32 = 1024;

/// Edge length used when a shape declares no size at all.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Outer bounds used by spatial indices before the host reports a size.
pub const DEFAULT_SURFACE_WIDTH: f64 = 1920.0;

/// Outer bounds used by spatial indices before the host reports a size.
pub const DEFAULT_SURFACE_HEIGHT: f64 = 1080.0;
