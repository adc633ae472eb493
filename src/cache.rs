//! Capped cache of host gradient and pattern handles.
//!
//! Entries are keyed by the JSON serialization of their spec, so two specs
//! that serialize identically share one host object. Each map keeps insertion
//! order; once a map exceeds its cap, the oldest insertions are dropped until
//! it is back at the cap. Hits do not refresh an entry's position.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{trace, warn};

use crate::error::ContextError;
use crate::metrics::CacheStats;
use crate::paint::{LinearGradient, PatternSpec, RadialGradient};
use crate::raster::RasterContext;

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum GradientSpec<'a> {
    Linear(&'a LinearGradient),
    Radial(&'a RadialGradient),
}

#[derive(Debug)]
pub struct PaintCache<G, P> {
    gradients: IndexMap<String, G>,
    patterns: IndexMap<String, P>,
    gradient_cap: usize,
    pattern_cap: usize,
    stats: CacheStats,
}

impl<G: Clone, P: Clone> PaintCache<G, P> {
    #[must_use]
    pub fn new(gradient_cap: usize, pattern_cap: usize) -> Self {
        Self {
            gradients: IndexMap::new(),
            patterns: IndexMap::new(),
            gradient_cap,
            pattern_cap,
            stats: CacheStats::default(),
        }
    }

    /// Cached or freshly created linear gradient.
    ///
    /// # Errors
    ///
    /// Propagates the host's rejection of the gradient; nothing is cached then.
    pub fn linear_gradient<C>(&mut self, ctx: &mut C, spec: &LinearGradient) -> Result<G, ContextError>
    where
        C: RasterContext<Gradient = G, Pattern = P>,
    {
        let key = cache_key(&GradientSpec::Linear(spec));
        self.gradient_with(key, || ctx.create_linear_gradient(spec))
    }

    /// Cached or freshly created radial gradient.
    ///
    /// # Errors
    ///
    /// Propagates the host's rejection of the gradient; nothing is cached then.
    pub fn radial_gradient<C>(&mut self, ctx: &mut C, spec: &RadialGradient) -> Result<G, ContextError>
    where
        C: RasterContext<Gradient = G, Pattern = P>,
    {
        let key = cache_key(&GradientSpec::Radial(spec));
        self.gradient_with(key, || ctx.create_radial_gradient(spec))
    }

    /// Cached or freshly created pattern.
    ///
    /// # Errors
    ///
    /// Propagates the host's failure to resolve the pattern image.
    pub fn pattern<C>(&mut self, ctx: &mut C, spec: &PatternSpec) -> Result<P, ContextError>
    where
        C: RasterContext<Gradient = G, Pattern = P>,
    {
        let Some(key) = cache_key(spec) else {
            return ctx.create_pattern(spec);
        };
        if let Some(hit) = self.patterns.get(&key) {
            self.stats.pattern_hits += 1;
            return Ok(hit.clone());
        }
        self.stats.pattern_misses += 1;
        let created = ctx.create_pattern(spec)?;
        self.patterns.insert(key, created.clone());
        self.stats.evictions += evict_oldest(&mut self.patterns, self.pattern_cap);
        Ok(created)
    }

    fn gradient_with<F>(&mut self, key: Option<String>, create: F) -> Result<G, ContextError>
    where
        F: FnOnce() -> Result<G, ContextError>,
    {
        let Some(key) = key else {
            return create();
        };
        if let Some(hit) = self.gradients.get(&key) {
            self.stats.gradient_hits += 1;
            return Ok(hit.clone());
        }
        self.stats.gradient_misses += 1;
        let created = create()?;
        self.gradients.insert(key, created.clone());
        self.stats.evictions += evict_oldest(&mut self.gradients, self.gradient_cap);
        Ok(created)
    }

    #[must_use]
    pub fn gradient_count(&self) -> usize {
        self.gradients.len()
    }

    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn clear(&mut self) {
        self.gradients.clear();
        self.patterns.clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

fn cache_key<T: Serialize + ?Sized>(spec: &T) -> Option<String> {
    match serde_json::to_string(spec) {
        Ok(key) => Some(key),
        Err(err) => {
            warn!(error = %err, "paint spec not serializable; bypassing cache");
            None
        }
    }
}

fn evict_oldest<V>(map: &mut IndexMap<String, V>, cap: usize) -> u64 {
    let excess = map.len().saturating_sub(cap);
    if excess == 0 {
        return 0;
    }
    map.drain(..excess).for_each(drop);
    trace!(excess, cap, "paint cache evicted oldest entries");
    excess as u64
}
