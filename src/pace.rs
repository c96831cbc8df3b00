//! Lap pace cleaning.
//!
//! Turns one driver's laps into an ordered pace series. Laps that do not
//! reflect racing pace (pit in/out, non-green track status, untimed) are
//! dropped; laps slower than 107% of the median are flagged but kept.

use std::borrow::Borrow;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{AnalysisConfig, LapRecord};

/// One lap of a pace series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceSample {
    pub lap_number: u32,
    /// Lap time in seconds
    pub lap_time: f64,
    pub compound: Option<String>,
    /// Slower than the outlier threshold
    pub is_outlier: bool,
}

impl PaceSample {
    pub fn new(lap_number: u32, lap_time: f64) -> Self {
        Self {
            lap_number,
            lap_time,
            compound: None,
            is_outlier: false,
        }
    }

    pub fn with_compound(mut self, compound: &str) -> Self {
        self.compound = Some(compound.to_string());
        self
    }
}

/// Laps of one driver, in feed order.
pub fn laps_for_driver<'a>(laps: &'a [LapRecord], driver: &str) -> Vec<&'a LapRecord> {
    laps.iter().filter(|l| l.driver == driver).collect()
}

/// Build a pace series from one driver's laps.
///
/// Untimed laps, pit-in/pit-out laps and laps under a non-green track status
/// are always excluded. When `remove_outliers` is set, laps slower than
/// `median * config.outlier_ratio` are flagged as outliers; flagged laps are
/// still returned. An invalid `config` logs a warning and flags nothing. The
/// result is sorted by lap number.
///
/// # Example
/// ```
/// use lapdelta::{AnalysisConfig, LapRecord, clean_pace};
///
/// let laps: Vec<_> = [90.0, 91.0, 90.0, 150.0, 89.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &t)| LapRecord::new("VER", i as u32 + 1, t))
///     .collect();
///
/// let pace = clean_pace(&laps, true, &AnalysisConfig::default());
/// assert_eq!(pace.len(), 5);
/// assert_eq!(pace.iter().filter(|p| p.is_outlier).count(), 1);
/// ```
pub fn clean_pace<L>(laps: &[L], remove_outliers: bool, config: &AnalysisConfig) -> Vec<PaceSample>
where
    L: Borrow<LapRecord>,
{
    let mut samples: Vec<PaceSample> = laps
        .iter()
        .map(Borrow::<LapRecord>::borrow)
        .filter(|l| l.is_representative())
        .filter_map(|l| {
            Some(PaceSample {
                lap_number: l.lap_number,
                lap_time: l.timed()?,
                compound: l.compound.clone(),
                is_outlier: false,
            })
        })
        .collect();

    if samples.is_empty() {
        return samples;
    }

    if remove_outliers {
        match config.validate() {
            Ok(()) => flag_outliers(&mut samples, config.outlier_ratio),
            Err(e) => warn!("[Pace] {}; outliers not flagged", e),
        }
    }

    samples.sort_by_key(|s| s.lap_number);
    samples
}

fn flag_outliers(samples: &mut [PaceSample], ratio: f64) {
    let times: Vec<f64> = samples.iter().map(|s| s.lap_time).collect();
    let Some(median_time) = median(&times) else {
        return;
    };

    let threshold = median_time * ratio;
    for sample in samples.iter_mut() {
        sample.is_outlier = sample.lap_time > threshold;
    }
    debug!(
        "[Pace] median {:.3}s, threshold {:.3}s, {} of {} laps flagged",
        median_time,
        threshold,
        samples.iter().filter(|s| s.is_outlier).count(),
        samples.len()
    );
}

/// Median of finite values; mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
