//! # Analysis Engine
//!
//! Caller-owned memoization around the pure analysis functions, for front
//! ends that ask for the same comparison or pace model many times.
//!
//! ## Architecture
//!
//! The engine is composed of focused modules:
//! - `TraceStore` - Lap telemetry keyed by driver and lap number
//! - `ComparisonCache` - Lazy lap comparisons with per-lap invalidation
//!
//! Lap records, pace series and degradation models are held per driver and
//! invalidated whenever that driver's laps are replaced.

pub mod comparison_cache;
pub mod trace_store;

pub use comparison_cache::ComparisonCache;
pub use trace_store::{LapKey, TraceData, TraceStore};

use std::collections::HashMap;

use log::info;
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::split::LapComparison;
use crate::{
    AnalysisConfig, DegradationModel, LapRecord, PaceSample, Stint, TelemetrySample, clean_pace,
    extract_stints, fit_clean_degradation,
};

/// Counters describing the engine's cached state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub trace_count: usize,
    pub driver_count: usize,
    pub cached_comparisons: usize,
    pub cached_pace_series: usize,
    pub comparison_hits: u64,
    pub comparison_misses: u64,
}

/// Memoizing analysis engine.
///
/// Every cached value is a pure function of the stored inputs and the
/// configuration, so replacing an input or the configuration only has to
/// drop the affected cache entries.
pub struct AnalysisEngine {
    pub traces: TraceStore,
    pub comparisons: ComparisonCache,

    laps: HashMap<String, Vec<LapRecord>>,
    pace_cache: HashMap<(String, bool), Vec<PaceSample>>,
    degradation_cache: HashMap<String, DegradationModel>,

    config: AnalysisConfig,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    /// Create a new engine with default configuration.
    pub fn new() -> Self {
        Self {
            traces: TraceStore::new(),
            comparisons: ComparisonCache::new(),
            laps: HashMap::new(),
            pace_cache: HashMap::new(),
            degradation_cache: HashMap::new(),
            config: AnalysisConfig::default(),
        }
    }

    /// Create a new engine with a custom configuration.
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replace the configuration and drop every cached result.
    pub fn set_config(&mut self, config: AnalysisConfig) -> Result<()> {
        config.validate()?;
        if config != self.config {
            self.config = config;
            self.invalidate_all();
        }
        Ok(())
    }

    // ========================================================================
    // Trace Management (delegates to TraceStore)
    // ========================================================================

    /// Add or replace the telemetry of a lap.
    pub fn add_trace(&mut self, key: LapKey, samples: Vec<TelemetrySample>) {
        let dropped = self.comparisons.invalidate(&key);
        if dropped > 0 {
            info!("[Engine] {} replaced, dropped {} cached comparisons", key, dropped);
        }
        self.traces.add(key, samples);
    }

    /// Remove the telemetry of a lap.
    pub fn remove_trace(&mut self, key: &LapKey) -> bool {
        self.comparisons.invalidate(key);
        self.traces.remove(key).is_some()
    }

    pub fn has_trace(&self, key: &LapKey) -> bool {
        self.traces.contains(key)
    }

    // ========================================================================
    // Lap Records
    // ========================================================================

    /// Add or replace the lap records of a driver.
    pub fn set_laps(&mut self, driver: &str, laps: Vec<LapRecord>) {
        self.pace_cache.retain(|(d, _), _| d != driver);
        self.degradation_cache.remove(driver);
        self.laps.insert(driver.to_string(), laps);
    }

    /// Add a session's lap records, grouped by driver.
    pub fn set_session_laps(&mut self, laps: &[LapRecord]) {
        let mut by_driver: HashMap<&str, Vec<LapRecord>> = HashMap::new();
        for lap in laps {
            by_driver.entry(lap.driver.as_str()).or_default().push(lap.clone());
        }
        for (driver, driver_laps) in by_driver {
            self.set_laps(driver, driver_laps);
        }
    }

    /// Drivers with lap records, sorted.
    pub fn drivers(&self) -> Vec<&str> {
        let mut drivers: Vec<&str> = self.laps.keys().map(String::as_str).collect();
        drivers.sort_unstable();
        drivers
    }

    pub fn laps(&self, driver: &str) -> Option<&[LapRecord]> {
        self.laps.get(driver).map(Vec::as_slice)
    }

    // ========================================================================
    // Cached Analyses
    // ========================================================================

    /// Speed comparison of two stored laps.
    pub fn compare(&mut self, first: &LapKey, second: &LapKey) -> Result<&LapComparison> {
        self.comparisons
            .get(first, second, &self.traces, &self.config)
    }

    /// Cleaned pace series of a driver.
    pub fn pace(&mut self, driver: &str, remove_outliers: bool) -> Result<&[PaceSample]> {
        let laps = self
            .laps
            .get(driver)
            .ok_or_else(|| AnalysisError::UnknownDriver(driver.to_string()))?;

        let key = (driver.to_string(), remove_outliers);
        let config = &self.config;
        let series = self
            .pace_cache
            .entry(key)
            .or_insert_with(|| clean_pace(laps, remove_outliers, config));
        Ok(series.as_slice())
    }

    /// Degradation model of a driver, fitted on the outlier-free pace series.
    pub fn degradation(&mut self, driver: &str) -> Result<DegradationModel> {
        if let Some(model) = self.degradation_cache.get(driver) {
            return Ok(*model);
        }
        let model = fit_clean_degradation(self.pace(driver, true)?);
        self.degradation_cache.insert(driver.to_string(), model);
        Ok(model)
    }

    /// Tyre stints of a driver over all recorded laps.
    pub fn stints(&self, driver: &str) -> Result<Vec<Stint>> {
        let laps = self
            .laps
            .get(driver)
            .ok_or_else(|| AnalysisError::UnknownDriver(driver.to_string()))?;
        Ok(extract_stints(laps))
    }

    // ========================================================================
    // Housekeeping
    // ========================================================================

    /// Drop every cached result, keeping the inputs.
    pub fn invalidate_all(&mut self) {
        self.comparisons.clear();
        self.pace_cache.clear();
        self.degradation_cache.clear();
    }

    /// Clear all inputs and cached results.
    pub fn clear(&mut self) {
        self.traces.clear();
        self.laps.clear();
        self.invalidate_all();
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            trace_count: self.traces.len(),
            driver_count: self.laps.len(),
            cached_comparisons: self.comparisons.len(),
            cached_pace_series: self.pace_cache.len(),
            comparison_hits: self.comparisons.hits(),
            comparison_misses: self.comparisons.misses(),
        }
    }
}
