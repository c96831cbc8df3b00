//! Lazy lap comparison cache.
//!
//! Comparisons are computed on first request and reused until one of the two
//! laps is replaced or removed, or the configuration changes. Keys are the
//! ordered pair of lap identities, so `(a, b)` and `(b, a)` are distinct
//! entries with mirrored sides.

use std::collections::HashMap;

use log::debug;

use crate::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::split::{LapComparison, compare_laps};

use super::trace_store::{LapKey, TraceStore};

/// Cache for lap comparisons with per-lap invalidation.
#[derive(Debug, Default)]
pub struct ComparisonCache {
    comparisons: HashMap<(LapKey, LapKey), LapComparison>,
    hits: u64,
    misses: u64,
}

impl ComparisonCache {
    /// Create a new empty comparison cache.
    pub fn new() -> Self {
        Self {
            comparisons: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Drop every cached comparison involving `key`.
    ///
    /// Returns the number of comparisons dropped.
    pub fn invalidate(&mut self, key: &LapKey) -> usize {
        let before = self.comparisons.len();
        self.comparisons.retain(|(a, b), _| a != key && b != key);
        before - self.comparisons.len()
    }

    /// Clear all cached comparisons (e.g., after a config change).
    pub fn clear(&mut self) {
        self.comparisons.clear();
    }

    /// Get a comparison, computing it if necessary.
    ///
    /// Fails with `MissingTrace` if either lap is not in `store`, or with the
    /// comparison's own error. Failures are not cached.
    pub fn get(
        &mut self,
        first: &LapKey,
        second: &LapKey,
        store: &TraceStore,
        config: &AnalysisConfig,
    ) -> Result<&LapComparison> {
        let key = (first.clone(), second.clone());

        if self.comparisons.contains_key(&key) {
            self.hits += 1;
        } else {
            let samples1 = store
                .get_samples(first)
                .ok_or_else(|| AnalysisError::MissingTrace(first.to_string()))?;
            let samples2 = store
                .get_samples(second)
                .ok_or_else(|| AnalysisError::MissingTrace(second.to_string()))?;

            let comparison = compare_laps(samples1, samples2, config)?;
            debug!(
                "[Engine] compared {} vs {}: {} segments",
                first,
                second,
                comparison.segments.len()
            );
            self.misses += 1;
            self.comparisons.insert(key.clone(), comparison);
        }

        self.comparisons
            .get(&key)
            .ok_or_else(|| AnalysisError::MissingTrace(first.to_string()))
    }

    /// Get a comparison without computing (returns None if not cached).
    pub fn get_cached(&self, first: &LapKey, second: &LapKey) -> Option<&LapComparison> {
        self.comparisons.get(&(first.clone(), second.clone()))
    }

    pub fn contains(&self, first: &LapKey, second: &LapKey) -> bool {
        self.get_cached(first, second).is_some()
    }

    /// Requests answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Requests that had to compute a comparison.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Side, TelemetrySample};

    fn lap(speed: f64) -> Vec<TelemetrySample> {
        (0..=40)
            .map(|i| TelemetrySample::new(i as f64 * 25.0, i as f64 * 0.4).with_speed(speed))
            .collect()
    }

    fn setup_store() -> TraceStore {
        let mut store = TraceStore::new();
        store.add(LapKey::new("VER", 10), lap(250.0));
        store.add(LapKey::new("HAM", 10), lap(240.0));
        store.add(LapKey::new("LEC", 10), lap(245.0));
        store
    }

    #[test]
    fn test_get_computes_then_hits() {
        let store = setup_store();
        let mut cache = ComparisonCache::new();
        let config = AnalysisConfig::default();
        let (a, b) = (LapKey::new("VER", 10), LapKey::new("HAM", 10));

        let side = cache.get(&a, &b, &store, &config).unwrap().segments[0].side;
        assert_eq!(side, Side::First);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);

        cache.get(&a, &b, &store, &config).unwrap();
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reversed_pair_is_separate_entry() {
        let store = setup_store();
        let mut cache = ComparisonCache::new();
        let config = AnalysisConfig::default();
        let (a, b) = (LapKey::new("VER", 10), LapKey::new("HAM", 10));

        cache.get(&a, &b, &store, &config).unwrap();
        let reversed = cache.get(&b, &a, &store, &config).unwrap();
        assert_eq!(reversed.segments[0].side, Side::Second);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalidate_drops_pairs_with_lap() {
        let store = setup_store();
        let mut cache = ComparisonCache::new();
        let config = AnalysisConfig::default();
        let ver = LapKey::new("VER", 10);
        let ham = LapKey::new("HAM", 10);
        let lec = LapKey::new("LEC", 10);

        cache.get(&ver, &ham, &store, &config).unwrap();
        cache.get(&ham, &lec, &store, &config).unwrap();
        cache.get(&lec, &ver, &store, &config).unwrap();

        assert_eq!(cache.invalidate(&ver), 2);
        assert!(cache.contains(&ham, &lec));
        assert!(!cache.contains(&ver, &ham));
    }

    #[test]
    fn test_get_cached_does_not_compute() {
        let cache = ComparisonCache::new();

        assert!(
            cache
                .get_cached(&LapKey::new("VER", 10), &LapKey::new("HAM", 10))
                .is_none()
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_trace() {
        let store = setup_store();
        let mut cache = ComparisonCache::new();
        let config = AnalysisConfig::default();

        let result = cache.get(
            &LapKey::new("VER", 10),
            &LapKey::new("ALO", 10),
            &store,
            &config,
        );
        assert!(matches!(result, Err(AnalysisError::MissingTrace(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_comparison_not_cached() {
        let mut store = setup_store();
        let far: Vec<TelemetrySample> = (0..10)
            .map(|i| TelemetrySample::new(5000.0 + i as f64 * 10.0, i as f64).with_speed(200.0))
            .collect();
        store.add(LapKey::new("ALO", 10), far);

        let mut cache = ComparisonCache::new();
        let result = cache.get(
            &LapKey::new("VER", 10),
            &LapKey::new("ALO", 10),
            &store,
            &AnalysisConfig::default(),
        );
        assert!(matches!(result, Err(AnalysisError::EmptyOverlap { .. })));
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 0);
    }
}
