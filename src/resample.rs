//! Shared-grid resampling of two laps.
//!
//! Two laps are never sampled at the same distances. This module projects
//! both onto one evenly spaced distance grid, clipped to the range both laps
//! actually cover, so that their channels can be compared index by index.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, OptionExt, Result};
use crate::{AnalysisConfig, Channel, TelemetrySample};

/// Channel values of one lap on the shared grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResampledTrace {
    channels: BTreeMap<Channel, Vec<f64>>,
}

impl ResampledTrace {
    /// Values of a channel, if it was requested.
    pub fn get(&self, channel: Channel) -> Option<&[f64]> {
        self.channels.get(&channel).map(Vec::as_slice)
    }

    /// Requested channels, in channel order.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.keys().copied()
    }

    /// Value of a channel at one grid index.
    pub fn value_at(&self, channel: Channel, index: usize) -> Option<f64> {
        self.channels.get(&channel)?.get(index).copied()
    }
}

/// Two laps resampled onto one distance grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledPair {
    /// Grid positions in metres, evenly spaced over `[lo, hi]`
    pub positions: Vec<f64>,
    pub first: ResampledTrace,
    pub second: ResampledTrace,
    /// Start of the shared distance range
    pub lo: f64,
    /// End of the shared distance range
    pub hi: f64,
}

impl ResampledPair {
    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Resample two laps onto a shared, evenly spaced distance grid.
///
/// The grid covers the distance range both laps recorded. It has
/// `grid_size` points, or fewer when the overlap spans fewer whole metres.
/// Each requested channel is linearly interpolated against the lap's own
/// samples; missing or non-finite channel values count as 0.0.
///
/// Returns `EmptyOverlap` if either lap has fewer than 2 samples with a
/// finite position, or if the laps share no distance range.
///
/// # Example
/// ```
/// use lapdelta::{Channel, TelemetrySample, resample};
///
/// let lap1: Vec<_> = (0..=10).map(|i| TelemetrySample::new(i as f64 * 100.0, i as f64).with_speed(200.0)).collect();
/// let lap2: Vec<_> = (0..=10).map(|i| TelemetrySample::new(i as f64 * 95.0, i as f64).with_speed(210.0)).collect();
///
/// let pair = resample(&lap1, &lap2, &[Channel::Speed], 50).unwrap();
/// assert_eq!(pair.len(), 50);
/// assert_eq!(pair.hi, 950.0);
/// ```
pub fn resample(
    first: &[TelemetrySample],
    second: &[TelemetrySample],
    channels: &[Channel],
    grid_size: usize,
) -> Result<ResampledPair> {
    if grid_size == 0 {
        return Err(AnalysisError::InvalidConfig(
            "grid_size must be at least 1".to_string(),
        ));
    }

    let first: Vec<&TelemetrySample> = first.iter().filter(|s| s.is_valid()).collect();
    let second: Vec<&TelemetrySample> = second.iter().filter(|s| s.is_valid()).collect();

    let (min1, max1) = position_range(&first).ok_or_empty_overlap(f64::NAN, f64::NAN)?;
    let (min2, max2) = position_range(&second).ok_or_empty_overlap(f64::NAN, f64::NAN)?;

    let lo = min1.max(min2);
    let hi = max1.min(max2);
    if hi <= lo {
        return Err(AnalysisError::EmptyOverlap { lo, hi });
    }

    let count = grid_len(lo, hi, grid_size);
    let positions = linspace(lo, hi, count);

    debug!(
        "[Resample] overlap {:.1}..{:.1} m, {} grid points ({} / {} source samples)",
        lo,
        hi,
        count,
        first.len(),
        second.len()
    );

    Ok(ResampledPair {
        first: resample_trace(&first, channels, &positions),
        second: resample_trace(&second, channels, &positions),
        positions,
        lo,
        hi,
    })
}

/// Resample with the grid size from `config`.
pub fn resample_with_config(
    first: &[TelemetrySample],
    second: &[TelemetrySample],
    channels: &[Channel],
    config: &AnalysisConfig,
) -> Result<ResampledPair> {
    resample(first, second, channels, config.grid_size)
}

/// Number of grid points for an overlap.
///
/// Never more than the whole metres the overlap spans, so a short overlap is
/// not padded with interpolated points the source cannot support. At least 1.
pub fn grid_len(lo: f64, hi: f64, grid_size: usize) -> usize {
    let span = (hi - lo).floor();
    let cap = if span >= grid_size as f64 {
        grid_size
    } else {
        span as usize
    };
    cap.max(1)
}

/// `count` evenly spaced values over `[lo, hi]`, both ends included.
pub fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| lo + step * i as f64).collect();
            // Pin the end so rounding cannot push it past the overlap
            values[count - 1] = hi;
            values
        }
    }
}

/// Linear interpolation of `fp` over ascending `xp` at `x`.
///
/// Values outside `xp` are clamped to the first/last value. Returns 0.0 for
/// empty input.
pub fn interpolate(xp: &[f64], fp: &[f64], x: f64) -> f64 {
    let len = xp.len().min(fp.len());
    if len == 0 {
        return 0.0;
    }

    // First index with xp > x
    let idx = xp[..len].partition_point(|&p| p <= x);
    if idx == 0 {
        return fp[0];
    }
    if idx >= len {
        return fp[len - 1];
    }

    let (x0, x1) = (xp[idx - 1], xp[idx]);
    let (y0, y1) = (fp[idx - 1], fp[idx]);
    let ratio = (x - x0) / (x1 - x0);
    y0 + ratio * (y1 - y0)
}

fn position_range(samples: &[&TelemetrySample]) -> Option<(f64, f64)> {
    if samples.len() < 2 {
        return None;
    }
    let min = samples.iter().map(|s| s.position).fold(f64::INFINITY, f64::min);
    let max = samples
        .iter()
        .map(|s| s.position)
        .fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

fn resample_trace(
    samples: &[&TelemetrySample],
    channels: &[Channel],
    positions: &[f64],
) -> ResampledTrace {
    let xp: Vec<f64> = samples.iter().map(|s| s.position).collect();

    let channels = channels
        .iter()
        .map(|&channel| {
            let fp: Vec<f64> = samples
                .iter()
                .map(|s| channel.value(s).filter(|v| v.is_finite()).unwrap_or(0.0))
                .collect();
            let values = positions
                .iter()
                .map(|&x| interpolate(&xp, &fp, x))
                .collect();
            (channel, values)
        })
        .collect();

    ResampledTrace { channels }
}
