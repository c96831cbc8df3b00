//! Corner, straight and activation-zone extraction from a single lap.
//!
//! Each extractor labels the samples with a boolean condition, segments the
//! labels into runs and keeps only the runs where the condition holds.

use serde::{Deserialize, Serialize};

use crate::segment::true_runs;
use crate::{Channel, TelemetrySample};

/// Slowest (corner) or fastest (straight) point of a run of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedExtreme {
    /// 1-based number in course order
    pub number: u32,
    /// Minimum speed for corners, maximum for straights (km/h)
    pub speed: f64,
    /// Distance at which the extreme occurs
    pub position: f64,
    /// Sample index range `[start, end)`
    pub start: usize,
    pub end: usize,
}

/// A stretch of the lap where an activation channel was on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub start_position: f64,
    pub end_position: f64,
    pub start: usize,
    pub end: usize,
    /// Top speed inside the zone, `None` if no sample recorded a speed
    pub peak_speed: Option<f64>,
    /// Distance at which `peak_speed` occurs
    pub peak_position: Option<f64>,
}

impl Zone {
    pub fn length(&self) -> f64 {
        self.end_position - self.start_position
    }
}

/// Corners: runs below `threshold` km/h, each summarised by its minimum speed.
///
/// Samples without a speed value are not part of any corner.
pub fn extract_corners(samples: &[TelemetrySample], threshold: f64) -> Vec<SpeedExtreme> {
    speed_extremes(samples, |v| v < threshold, |candidate, best| candidate < best)
}

/// Straights: runs above `threshold` km/h, each summarised by its maximum speed.
pub fn extract_straights(samples: &[TelemetrySample], threshold: f64) -> Vec<SpeedExtreme> {
    speed_extremes(samples, |v| v > threshold, |candidate, best| candidate > best)
}

/// DRS zones: runs with DRS above zero longer than `min_length` metres.
///
/// # Example
/// ```
/// use lapdelta::{TelemetrySample, extract_zones};
///
/// let lap: Vec<_> = (0..100)
///     .map(|i| {
///         let drs = if (20..50).contains(&i) { 12.0 } else { 0.0 };
///         TelemetrySample::new(i as f64 * 10.0, i as f64 * 0.1).with_drs(drs)
///     })
///     .collect();
/// let zones = extract_zones(&lap, 100.0);
/// assert_eq!(zones.len(), 1);
/// assert_eq!((zones[0].start_position, zones[0].end_position), (200.0, 490.0));
/// ```
pub fn extract_zones(samples: &[TelemetrySample], min_length: f64) -> Vec<Zone> {
    extract_activation_zones(samples, Channel::Drs, min_length)
}

/// Runs where `channel` is above zero, longer than `min_length` metres.
///
/// A zone spans from the position of its first sample to the position of its
/// last sample; zones whose span does not exceed `min_length` are dropped.
/// Each zone carries its top speed and where it was reached (first
/// occurrence on ties).
pub fn extract_activation_zones(
    samples: &[TelemetrySample],
    channel: Channel,
    min_length: f64,
) -> Vec<Zone> {
    true_runs(samples, |s| channel.value(s).is_some_and(|v| v > 0.0))
        .into_iter()
        .map(|run| {
            let peak = extreme_speed(&samples[run.range()], |candidate, best| candidate > best);
            Zone {
                start_position: samples[run.start].position,
                end_position: samples[run.last()].position,
                start: run.start,
                end: run.end,
                peak_speed: peak.map(|(speed, _)| speed),
                peak_position: peak.map(|(_, position)| position),
            }
        })
        .filter(|zone| zone.length() > min_length)
        .collect()
}

fn speed_extremes<P, B>(samples: &[TelemetrySample], in_run: P, better: B) -> Vec<SpeedExtreme>
where
    P: Fn(f64) -> bool,
    B: Fn(f64, f64) -> bool,
{
    true_runs(samples, |s| s.speed.is_some_and(&in_run))
        .into_iter()
        .enumerate()
        .filter_map(|(i, run)| {
            let (speed, position) = extreme_speed(&samples[run.range()], &better)?;
            Some(SpeedExtreme {
                number: i as u32 + 1,
                speed,
                position,
                start: run.start,
                end: run.end,
            })
        })
        .collect()
}

/// Extreme speed of a run and its position.
fn extreme_speed<B>(run: &[TelemetrySample], better: B) -> Option<(f64, f64)>
where
    B: Fn(f64, f64) -> bool,
{
    let mut best: Option<(f64, f64)> = None;
    for sample in run {
        let Some(speed) = sample.speed else { continue };
        // Strict comparison keeps the first occurrence on ties
        if best.is_none_or(|(b, _)| better(speed, b)) {
            best = Some((speed, sample.position));
        }
    }
    best
}
