//! Diagnostic counters.
//!
//! Each subsystem owns its counters and hands out copies; nothing here is
//! shared or mutated from outside the owning subsystem.

use serde::Serialize;

use crate::spatial::TreeStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchStats {
    pub operations_queued: u64,
    pub operations_executed: u64,
    /// Operations that ran as part of a multi-operation batch.
    pub operations_batched: u64,
    pub batches_executed: u64,
    /// Times a batch paint state was applied to a context.
    pub state_applications: u64,
    pub operations_failed: u64,
    pub retries_scheduled: u64,
    pub operations_abandoned: u64,
    /// Operations dropped by a flush without a target.
    pub operations_discarded: u64,
    pub auto_flushes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub gradient_hits: u64,
    pub gradient_misses: u64,
    pub pattern_hits: u64,
    pub pattern_misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PoolStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired: u64,
    /// Misses the factory could not serve.
    pub creation_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DirtyStats {
    pub marked: u64,
    pub merged: u64,
    pub evicted: u64,
    pub redraws: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InteractionStats {
    pub resolves: u64,
    pub hits: u64,
    pub throttled_moves: u64,
    pub events_dispatched: u64,
}

/// Read-only snapshot of every subsystem's counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub batch: BatchStats,
    pub cache: CacheStats,
    pub pool: PoolStats,
    pub dirty: DirtyStats,
    pub interaction: InteractionStats,
    pub dirty_index: TreeStats,
    pub interactive_index: TreeStats,
}

impl MetricsSnapshot {
    /// Render as JSON for logging or a diagnostics panel.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
