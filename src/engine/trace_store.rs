//! Lap trace storage.
//!
//! Holds the telemetry of every lap the caller has loaded, keyed by driver
//! and lap number.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TelemetrySample;

/// Identity of one lap of one driver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LapKey {
    pub driver: String,
    pub lap_number: u32,
}

impl LapKey {
    pub fn new(driver: &str, lap_number: u32) -> Self {
        Self {
            driver: driver.to_string(),
            lap_number,
        }
    }
}

impl fmt::Display for LapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.driver, self.lap_number)
    }
}

/// Telemetry of one stored lap
#[derive(Debug, Clone)]
pub struct TraceData {
    pub key: LapKey,
    pub samples: Vec<TelemetrySample>,
    /// Distance covered between first and last valid sample, in metres
    pub distance: f64,
}

/// Storage for lap telemetry.
#[derive(Debug, Default)]
pub struct TraceStore {
    traces: HashMap<LapKey, TraceData>,
}

impl TraceStore {
    /// Create a new empty trace store.
    pub fn new() -> Self {
        Self {
            traces: HashMap::new(),
        }
    }

    /// Add (or replace) the trace of a lap.
    ///
    /// Returns the distance the trace covers.
    pub fn add(&mut self, key: LapKey, samples: Vec<TelemetrySample>) -> f64 {
        let distance = Self::compute_distance(&samples);
        let data = TraceData {
            key: key.clone(),
            samples,
            distance,
        };
        self.traces.insert(key, data);
        distance
    }

    /// Remove a trace. Returns the removed data if it existed.
    pub fn remove(&mut self, key: &LapKey) -> Option<TraceData> {
        self.traces.remove(key)
    }

    /// Clear all traces.
    pub fn clear(&mut self) {
        self.traces.clear();
    }

    pub fn get(&self, key: &LapKey) -> Option<&TraceData> {
        self.traces.get(key)
    }

    /// Get the samples of a lap.
    pub fn get_samples(&self, key: &LapKey) -> Option<&[TelemetrySample]> {
        self.traces.get(key).map(|t| t.samples.as_slice())
    }

    pub fn contains(&self, key: &LapKey) -> bool {
        self.traces.contains_key(key)
    }

    /// Stored laps, sorted by driver then lap number.
    pub fn keys(&self) -> Vec<&LapKey> {
        let mut keys: Vec<&LapKey> = self.traces.keys().collect();
        keys.sort();
        keys
    }

    /// Stored laps of one driver, sorted by lap number.
    pub fn laps_of(&self, driver: &str) -> Vec<&LapKey> {
        let mut keys: Vec<&LapKey> = self.traces.keys().filter(|k| k.driver == driver).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Distance between the first and last valid sample of a trace.
    pub fn compute_distance(samples: &[TelemetrySample]) -> f64 {
        let mut valid = samples.iter().filter(|s| s.is_valid()).map(|s| s.position);
        let Some(first) = valid.next() else {
            return 0.0;
        };
        let (min, max) = valid.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        max - min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lap(points: usize) -> Vec<TelemetrySample> {
        (0..points)
            .map(|i| TelemetrySample::new(i as f64 * 25.0, i as f64 * 0.3).with_speed(180.0))
            .collect()
    }

    #[test]
    fn test_add_and_get() {
        let mut store = TraceStore::new();
        let distance = store.add(LapKey::new("VER", 12), sample_lap(41));

        assert_eq!(distance, 1000.0);
        assert!(store.contains(&LapKey::new("VER", 12)));
        assert_eq!(store.get_samples(&LapKey::new("VER", 12)).unwrap().len(), 41);
        assert!(store.get(&LapKey::new("VER", 13)).is_none());
    }

    #[test]
    fn test_replace_keeps_single_entry() {
        let mut store = TraceStore::new();
        store.add(LapKey::new("HAM", 3), sample_lap(10));
        store.add(LapKey::new("HAM", 3), sample_lap(20));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_samples(&LapKey::new("HAM", 3)).unwrap().len(), 20);
    }

    #[test]
    fn test_laps_of_driver_sorted() {
        let mut store = TraceStore::new();
        store.add(LapKey::new("LEC", 9), sample_lap(5));
        store.add(LapKey::new("LEC", 2), sample_lap(5));
        store.add(LapKey::new("SAI", 4), sample_lap(5));

        let laps: Vec<u32> = store.laps_of("LEC").iter().map(|k| k.lap_number).collect();
        assert_eq!(laps, vec![2, 9]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = TraceStore::new();
        store.add(LapKey::new("NOR", 1), sample_lap(5));
        store.add(LapKey::new("NOR", 2), sample_lap(5));

        assert!(store.remove(&LapKey::new("NOR", 1)).is_some());
        assert!(store.remove(&LapKey::new("NOR", 1)).is_none());
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_distance_ignores_invalid_positions() {
        let mut samples = sample_lap(5);
        samples.push(TelemetrySample::new(f64::NAN, 2.0));
        assert_eq!(TraceStore::compute_distance(&samples), 100.0);
        assert_eq!(TraceStore::compute_distance(&[]), 0.0);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(LapKey::new("PIA", 44).to_string(), "PIA#44");
    }
}
