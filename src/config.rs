//! Engine configuration.
//!
//! DESIGN
//! ======
//! Every subsystem has its own config struct with a `Default` built from the
//! constants in [`crate::consts`]. Configs deserialize with `#[serde(default)]`
//! so a host can ship a partial JSON document, and [`EngineConfig::from_env`]
//! lets a process override individual knobs through `DRAWKIT_*` variables.
//! Durations are stored as milliseconds to keep the serialized form flat.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;

// =============================================================================
// SUBSYSTEM CONFIGS
// =============================================================================

/// Quadtree capacity limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Objects a node holds before it splits.
    pub max_objects: usize,
    /// Deepest level a node may split to.
    pub max_depth: usize,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { max_objects: DEFAULT_MAX_OBJECTS_PER_NODE, max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// How a flush reacts to a failing shape routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushMode {
    /// The first failure aborts the flush and is returned to the caller.
    #[default]
    Immediate,
    /// Failures are rescheduled with linear back-off and never surface.
    Retry,
}

/// Operation batcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_queue_size: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// State groups larger than this get sorted by proximity and chunked.
    pub proximity_threshold: usize,
    pub row_tolerance: f64,
    pub chunk_size: usize,
    pub gradient_cache_size: usize,
    pub pattern_cache_size: usize,
    pub flush_mode: FlushMode,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            gradient_cache_size: DEFAULT_GRADIENT_CACHE_SIZE,
            pattern_cache_size: DEFAULT_PATTERN_CACHE_SIZE,
            flush_mode: FlushMode::default(),
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Dirty-region tracker limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirtyConfig {
    pub max_regions: usize,
}

impl Default for DirtyConfig {
    fn default() -> Self {
        Self { max_regions: DEFAULT_MAX_DIRTY_REGIONS }
    }
}

/// Surface pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_size: DEFAULT_MAX_POOL_SIZE, timeout_ms: DEFAULT_POOL_TIMEOUT_MS }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Pointer and touch dispatch tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hover_interval_ms: u64,
    pub double_tap_ms: u64,
    pub double_tap_distance: f64,
    pub hold_ms: u64,
    pub touch_enabled: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hover_interval_ms: DEFAULT_HOVER_INTERVAL_MS,
            double_tap_ms: DEFAULT_DOUBLE_TAP_MS,
            double_tap_distance: DEFAULT_DOUBLE_TAP_DISTANCE,
            hold_ms: DEFAULT_HOLD_MS,
            touch_enabled: true,
        }
    }
}

impl InteractionConfig {
    #[must_use]
    pub fn hover_interval(&self) -> Duration {
        Duration::from_millis(self.hover_interval_ms)
    }

    #[must_use]
    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }

    #[must_use]
    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// Complete configuration for an [`crate::engine::Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub spatial: SpatialConfig,
    pub batch: BatchConfig,
    pub dirty: DirtyConfig,
    pub pool: PoolConfig,
    pub interaction: InteractionConfig,
}

impl EngineConfig {
    /// Defaults overridden by any `DRAWKIT_*` environment variables that parse.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            spatial: SpatialConfig {
                max_objects: env_parse("DRAWKIT_MAX_OBJECTS_PER_NODE", defaults.spatial.max_objects),
                max_depth: env_parse("DRAWKIT_MAX_DEPTH", defaults.spatial.max_depth),
            },
            batch: BatchConfig {
                max_queue_size: env_parse("DRAWKIT_MAX_QUEUE_SIZE", defaults.batch.max_queue_size),
                max_retries: env_parse("DRAWKIT_MAX_RETRIES", defaults.batch.max_retries),
                retry_delay_ms: env_parse("DRAWKIT_RETRY_DELAY_MS", defaults.batch.retry_delay_ms),
                flush_mode: env_flush_mode("DRAWKIT_FLUSH_MODE", defaults.batch.flush_mode),
                ..defaults.batch
            },
            dirty: DirtyConfig { max_regions: env_parse("DRAWKIT_MAX_DIRTY_REGIONS", defaults.dirty.max_regions) },
            pool: PoolConfig {
                max_size: env_parse("DRAWKIT_MAX_POOL_SIZE", defaults.pool.max_size),
                timeout_ms: env_parse("DRAWKIT_POOL_TIMEOUT_MS", defaults.pool.timeout_ms),
            },
            interaction: InteractionConfig {
                hover_interval_ms: env_parse("DRAWKIT_HOVER_INTERVAL_MS", defaults.interaction.hover_interval_ms),
                double_tap_ms: env_parse("DRAWKIT_DOUBLE_TAP_MS", defaults.interaction.double_tap_ms),
                hold_ms: env_parse("DRAWKIT_HOLD_MS", defaults.interaction.hold_ms),
                ..defaults.interaction
            },
        }
    }

    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_flush_mode(key: &str, default: FlushMode) -> FlushMode {
    match std::env::var(key).as_deref().map(str::trim) {
        Ok("immediate") => FlushMode::Immediate,
        Ok("retry") => FlushMode::Retry,
        _ => default,
    }
}
