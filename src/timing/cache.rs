/*!
 * Memo table for resolved annotation intervals.
 *
 * Entries live for the lifetime of a loaded document. Any edit to marker
 * values or reference structure clears the whole table.
 */

use std::collections::HashMap;
use parking_lot::{Mutex, RwLock};
use log::debug;

use crate::document::{AnnotationId, ResolvedInterval};

/// Hit and miss counts since the last clear
#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    hits: usize,
    misses: usize,
}

/// Interval cache keyed by annotation id
pub struct IntervalCache {
    /// Internal cache storage
    entries: RwLock<HashMap<AnnotationId, ResolvedInterval>>,

    /// Lookup counters
    counters: Mutex<Counters>,

    /// Whether caching is enabled
    enabled: bool,
}

impl IntervalCache {
    /// Create a new interval cache
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            counters: Mutex::new(Counters::default()),
            enabled,
        }
    }

    /// Look up a resolved interval
    pub fn get(&self, id: &AnnotationId) -> Option<ResolvedInterval> {
        if !self.enabled {
            return None;
        }

        let found = self.entries.read().get(id).copied();
        let mut counters = self.counters.lock();
        match found {
            Some(interval) => {
                counters.hits += 1;
                debug!("Interval cache hit for {}", id);
                Some(interval)
            }
            None => {
                counters.misses += 1;
                None
            }
        }
    }

    /// Store a resolved interval
    pub fn store(&self, id: &AnnotationId, interval: ResolvedInterval) {
        if !self.enabled {
            return;
        }
        self.entries.write().insert(id.clone(), interval);
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let Counters { hits, misses } = *self.counters.lock();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.write().clear();
        *self.counters.lock() = Counters::default();

        debug!("Interval cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for IntervalCache {
    fn default() -> Self {
        Self::new(true)
    }
}
