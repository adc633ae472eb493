//! Raster surface pool.
//!
//! DESIGN
//! ======
//! Idle surfaces sit in insertion order. Lookup is a linear scan for an exact
//! `(width, height)` match; the pool is small (`max_size`, default 10) so a
//! scan beats any keyed structure. Returning a surface to a full pool evicts
//! the oldest-inserted entry first. Surfaces are erased with a single
//! `clear_rect` on return rather than recreated. `cleanup` drops entries idle
//! longer than `timeout`, independently of capacity eviction.

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::clock::Clock;
use crate::config::PoolConfig;
use crate::error::DrawError;
use crate::metrics::PoolStats;
use crate::raster::{RasterContext, Surface, SurfaceFactory};

/// An idle surface waiting for reuse.
#[derive(Debug)]
pub struct PooledSurface<S> {
    pub surface: S,
    pub width: u32,
    pub height: u32,
    pub last_used: Duration,
}

pub struct ResourcePool<F: SurfaceFactory> {
    factory: F,
    idle: Vec<PooledSurface<F::Surface>>,
    config: PoolConfig,
    clock: Rc<dyn Clock>,
    stats: PoolStats,
}

impl<F: SurfaceFactory> ResourcePool<F> {
    #[must_use]
    pub fn new(factory: F, config: PoolConfig, clock: Rc<dyn Clock>) -> Self {
        Self { factory, idle: Vec::new(), config, clock, stats: PoolStats::default() }
    }

    /// Take an idle surface of exactly `width x height`, or create one.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::SurfaceCreationFailed`] on a miss when the host
    /// cannot create surfaces. The pool is left unchanged; only
    /// `creation_failures` is counted.
    pub fn get_surface(&mut self, width: u32, height: u32) -> Result<F::Surface, DrawError> {
        if let Some(pos) = self
            .idle
            .iter()
            .position(|p| p.width == width && p.height == height)
        {
            self.stats.hits += 1;
            trace!(width, height, "surface pool hit");
            return Ok(self.idle.remove(pos).surface);
        }

        match self.factory.create_surface(width, height) {
            Ok(surface) => {
                self.stats.misses += 1;
                debug!(width, height, idle = self.idle.len(), "surface pool miss");
                Ok(surface)
            }
            Err(err) => {
                self.stats.creation_failures += 1;
                warn!(width, height, error = %err, "surface creation failed");
                Err(err)
            }
        }
    }

    /// Erase `surface` and keep it for reuse.
    pub fn return_surface(&mut self, mut surface: F::Surface, width: u32, height: u32) {
        if self.config.max_size == 0 {
            return;
        }
        if self.idle.len() >= self.config.max_size {
            let evicted = self.idle.remove(0);
            self.stats.evictions += 1;
            debug!(width = evicted.width, height = evicted.height, "surface pool evicted oldest");
        }

        surface
            .context()
            .clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
        self.idle.push(PooledSurface { surface, width, height, last_used: self.clock.now() });
    }

    /// Drop surfaces idle longer than the configured timeout. Returns how many were dropped.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now();
        let timeout = self.config.timeout();
        let before = self.idle.len();
        self.idle
            .retain(|p| now.saturating_sub(p.last_used) <= timeout);
        let dropped = before - self.idle.len();
        if dropped > 0 {
            self.stats.expired += dropped as u64;
            debug!(dropped, remaining = self.idle.len(), "surface pool expired idle surfaces");
        }
        dropped
    }

    /// Idle surfaces currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.idle.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idle.is_empty()
    }

    pub fn clear(&mut self) {
        self.idle.clear();
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Idle entries, oldest first.
    #[must_use]
    pub fn idle(&self) -> &[PooledSurface<F::Surface>] {
        &self.idle
    }
}
