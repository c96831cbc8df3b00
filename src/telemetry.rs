//! Per-lap telemetry summaries.

use std::collections::BTreeMap;

use crate::TelemetrySample;

/// Percentage of samples spent in each gear, rounded to 2 decimals.
///
/// Percentages are relative to all samples, so samples without a gear (or
/// in neutral) lower every share without getting an entry of their own.
///
/// # Example
/// ```
/// use lapdelta::{TelemetrySample, gear_usage};
///
/// let lap: Vec<_> = [3.0, 3.0, 4.0, 0.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &g)| TelemetrySample::new(i as f64, i as f64).with_gear(g))
///     .collect();
/// let usage = gear_usage(&lap);
/// assert_eq!(usage.get(&3), Some(&50.0));
/// assert_eq!(usage.get(&4), Some(&25.0));
/// assert!(!usage.contains_key(&0));
/// ```
pub fn gear_usage(samples: &[TelemetrySample]) -> BTreeMap<u8, f64> {
    if samples.is_empty() {
        return BTreeMap::new();
    }

    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for gear in samples.iter().filter_map(|s| s.gear) {
        if gear.is_finite() && gear >= 1.0 && gear <= u8::MAX as f64 {
            *counts.entry(gear as u8).or_default() += 1;
        }
    }

    let total = samples.len() as f64;
    counts
        .into_iter()
        .map(|(gear, count)| {
            let percentage = count as f64 / total * 100.0;
            (gear, (percentage * 100.0).round() / 100.0)
        })
        .collect()
}
