//! Faster-side performance splits between two laps.
//!
//! The signed speed difference along the shared distance grid is labelled
//! first-faster / second-faster / tie and segmented into runs. Each run is
//! summarised by its mean difference, which decides the authoritative side.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::resample::{ResampledPair, resample_with_config};
use crate::segment::segment_runs;
use crate::{AnalysisConfig, Channel, Side, TelemetrySample};

/// One point of a split: both values and their difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitPoint {
    pub index: usize,
    pub first: f64,
    pub second: f64,
    /// `first - second`
    pub delta: f64,
}

/// A run of the course where one side (or neither) is ahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSegment {
    pub start: usize,
    pub end: usize,
    /// Side derived from the mean delta over the run
    pub side: Side,
    pub mean_delta: f64,
    pub points: Vec<SplitPoint>,
}

impl SplitSegment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Split two equal-length series into faster-side segments.
///
/// `delta = first - second` is labelled `First` above `threshold`, `Second`
/// below `-threshold` and `Tie` otherwise. Each maximal run of a label becomes
/// one segment whose side is re-derived from the run's mean delta.
///
/// Returns `InsufficientSamples` if either series is empty or the lengths
/// differ, and `InvalidConfig` for a negative or non-finite threshold.
///
/// # Example
/// ```
/// use lapdelta::{Side, build_performance_split};
///
/// let first = [110.0, 110.0, 110.0, 90.0, 90.0];
/// let second = [100.0; 5];
/// let split = build_performance_split(&first, &second, 0.5).unwrap();
/// assert_eq!(split.len(), 2);
/// assert_eq!(split[0].side, Side::First);
/// assert_eq!((split[1].start, split[1].end), (3, 5));
/// ```
pub fn build_performance_split(
    first: &[f64],
    second: &[f64],
    threshold: f64,
) -> Result<Vec<SplitSegment>> {
    if first.is_empty() || second.is_empty() || first.len() != second.len() {
        return Err(AnalysisError::InsufficientSamples {
            first_len: first.len(),
            second_len: second.len(),
        });
    }
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(AnalysisError::InvalidConfig(format!(
            "tie threshold must be a non-negative number, got {}",
            threshold
        )));
    }

    let deltas: Vec<f64> = first.iter().zip(second).map(|(a, b)| a - b).collect();
    let labels: Vec<Side> = deltas
        .iter()
        .map(|&d| Side::from_delta(d, threshold))
        .collect();

    let segments: Vec<SplitSegment> = segment_runs(&labels)
        .into_iter()
        .map(|run| {
            let span = &deltas[run.range()];
            let mean_delta = span.iter().sum::<f64>() / span.len() as f64;

            let points = run
                .range()
                .map(|i| SplitPoint {
                    index: i,
                    first: first[i],
                    second: second[i],
                    delta: deltas[i],
                })
                .collect();

            SplitSegment {
                start: run.start,
                end: run.end,
                side: Side::from_delta(mean_delta, threshold),
                mean_delta,
                points,
            }
        })
        .collect();

    debug!(
        "[Split] {} points -> {} segments (threshold {})",
        deltas.len(),
        segments.len(),
        threshold
    );

    Ok(segments)
}

// ============================================================================
// Lap comparison
// ============================================================================

/// Per-sample detail of a compared segment, for point-level inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSample {
    pub position: f64,
    pub first_speed: f64,
    pub second_speed: f64,
    /// `first_speed - second_speed`
    pub delta: f64,
    /// Detail channel values of the first lap at this position
    pub first_channels: BTreeMap<Channel, f64>,
    /// Detail channel values of the second lap at this position
    pub second_channels: BTreeMap<Channel, f64>,
}

/// A faster-side segment placed on the distance axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSegment {
    pub side: Side,
    pub mean_delta: f64,
    /// Grid index range `[start, end)`
    pub start: usize,
    pub end: usize,
    /// Distance where the segment begins
    pub start_position: f64,
    /// Distance where the next segment begins (end of overlap for the last one)
    pub end_position: f64,
    /// Grid samples `[start, end]`; the last one is shared with the next
    /// segment, except for the final segment which stops at `end - 1`
    pub samples: Vec<ComparisonSample>,
}

impl ComparisonSegment {
    /// Length of the segment in metres.
    pub fn length(&self) -> f64 {
        self.end_position - self.start_position
    }
}

/// Speed comparison of two laps over their shared distance range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapComparison {
    pub resampled: ResampledPair,
    pub segments: Vec<ComparisonSegment>,
}

impl LapComparison {
    /// Fraction of the compared distance (0-1) on which `side` was ahead.
    pub fn share(&self, side: Side) -> f64 {
        let total = self.resampled.hi - self.resampled.lo;
        if total <= 0.0 {
            return 0.0;
        }
        let covered: f64 = self
            .segments
            .iter()
            .filter(|s| s.side == side)
            .map(|s| s.length())
            .sum();
        covered / total
    }

    /// Segments won by `side`, in course order.
    pub fn segments_for(&self, side: Side) -> impl Iterator<Item = &ComparisonSegment> {
        self.segments.iter().filter(move |s| s.side == side)
    }
}

/// Compare the speed of two laps along the course.
///
/// Both laps are resampled onto the shared distance grid with speed plus the
/// configured detail channels, split on the speed delta, and each segment is
/// annotated with its distance bounds and per-sample detail.
pub fn compare_laps(
    first: &[TelemetrySample],
    second: &[TelemetrySample],
    config: &AnalysisConfig,
) -> Result<LapComparison> {
    config.validate()?;

    let mut channels = vec![Channel::Speed];
    channels.extend(
        config
            .detail_channels
            .iter()
            .copied()
            .filter(|c| *c != Channel::Speed),
    );

    let resampled = resample_with_config(first, second, &channels, config)?;

    let empty: &[f64] = &[];
    let speed1 = resampled.first.get(Channel::Speed).unwrap_or(empty);
    let speed2 = resampled.second.get(Channel::Speed).unwrap_or(empty);
    let split = build_performance_split(speed1, speed2, config.tie_threshold)?;

    let positions = &resampled.positions;
    let segments = split
        .into_iter()
        .map(|seg| {
            let end_position = positions
                .get(seg.end)
                .copied()
                .unwrap_or(resampled.hi);

            // Include the next segment's first sample so drawn paths join up
            let last = (seg.end + 1).min(positions.len());
            let samples = (seg.start..last)
                .map(|i| ComparisonSample {
                    position: positions[i],
                    first_speed: speed1[i],
                    second_speed: speed2[i],
                    delta: speed1[i] - speed2[i],
                    first_channels: detail_at(&resampled, &config.detail_channels, i, true),
                    second_channels: detail_at(&resampled, &config.detail_channels, i, false),
                })
                .collect();

            ComparisonSegment {
                side: seg.side,
                mean_delta: seg.mean_delta,
                start: seg.start,
                end: seg.end,
                start_position: positions[seg.start],
                end_position,
                samples,
            }
        })
        .collect();

    Ok(LapComparison {
        resampled,
        segments,
    })
}

fn detail_at(
    pair: &ResampledPair,
    channels: &[Channel],
    index: usize,
    first: bool,
) -> BTreeMap<Channel, f64> {
    let trace = if first { &pair.first } else { &pair.second };
    channels
        .iter()
        .filter_map(|&c| trace.value_at(c, index).map(|v| (c, v)))
        .collect()
}
